//! Order-preserving CSV/TSV table.
//!
//! Cells are kept as the original strings so a table that is read, extended
//! with a column and written back reproduces every input value verbatim.
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

use crate::math::Array2;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Tab for `.tsv`, comma for anything else.
pub fn delimiter_for<P: AsRef<Path>>(path: P) -> u8 {
    match path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

impl CsvTable {
    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            bail!(
                "Row {} has {} fields but the header has {}",
                i + 1,
                row.len(),
                headers.len()
            );
        }
        Ok(Self { headers, rows })
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter_for(path))
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read header row of {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result.with_context(|| {
                format!("Failed to read row {} of {}", row_idx + 1, path.display())
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        log::debug!(
            "Read {} rows x {} columns from {}",
            rows.len(),
            headers.len(),
            path.display()
        );
        Ok(Self { headers, rows })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter_for(path))
            .from_writer(BufWriter::new(file));

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    /// Header lookup ignoring surrounding whitespace in the file's header text.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| anyhow!("Missing column '{}'", name))?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Parse a column as finite `f64` values.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .into_iter()
            .enumerate()
            .map(|(row_idx, cell)| parse_number(cell, name, row_idx))
            .collect()
    }

    /// Row-major feature matrix with columns in the order of `names`.
    pub fn feature_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<Array2<f32>> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name.as_ref())
                    .ok_or_else(|| anyhow!("Missing feature column '{}'", name.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut data: Vec<f32> = Vec::with_capacity(self.rows.len() * indices.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (&col, name) in indices.iter().zip(names) {
                data.push(parse_number(&row[col], name.as_ref(), row_idx)?);
            }
        }
        Array2::from_shape_vec((self.rows.len(), indices.len()), data)
            .context("Failed to build feature matrix")
    }

    /// Parse a binary label column. `0`/`1` and `0.0`/`1.0` are accepted.
    pub fn label_vector(&self, name: &str) -> Result<Vec<usize>> {
        self.column(name)
            .with_context(|| format!("Missing label column '{}'", name))?
            .into_iter()
            .enumerate()
            .map(|(row_idx, cell)| -> Result<usize> {
                let value: f64 = cell.trim().parse().map_err(|_| {
                    anyhow!("Invalid label '{}' in column '{}' at row {}", cell, name, row_idx + 1)
                })?;
                if value != 0.0 && value != 1.0 {
                    bail!(
                        "Label '{}' in column '{}' at row {} must be 0 or 1",
                        cell,
                        name,
                        row_idx + 1
                    );
                }
                Ok(value as usize)
            })
            .collect()
    }

    /// Append a column, or overwrite it in place if the name already exists.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            bail!(
                "Column '{}' has {} values but the table has {} rows",
                name,
                values.len(),
                self.rows.len()
            );
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}

fn parse_number<T>(cell: &str, column: &str, row_idx: usize) -> Result<T>
where
    T: FromStr + Copy + Into<f64>,
{
    let value: T = cell.trim().parse().map_err(|_| {
        anyhow!(
            "Invalid value '{}' in column '{}' at row {}",
            cell,
            column,
            row_idx + 1
        )
    })?;
    if !value.into().is_finite() {
        bail!(
            "Non-finite value '{}' in column '{}' at row {}",
            cell,
            column,
            row_idx + 1
        );
    }
    Ok(value)
}
