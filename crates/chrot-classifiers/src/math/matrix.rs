use std::error::Error;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Dense row-major matrix. Rows are samples, columns are features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Array2<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> Array2<T> {
    pub fn from_shape_vec(shape: (usize, usize), data: Vec<T>) -> Result<Self, ShapeError> {
        let (rows, cols) = shape;
        if data.len() != rows * cols {
            return Err(ShapeError {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Build a matrix from equally sized rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ShapeError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(ShapeError {
                    rows: nrows,
                    cols: ncols,
                    len: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: nrows,
            cols: ncols,
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        let start = self.offset(row, 0);
        &self.data[start..start + self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |r| self.row_slice(r))
    }

    pub fn column(&self, col: usize) -> Vec<T>
    where
        T: Clone,
    {
        assert!(col < self.cols, "column index out of bounds");
        (0..self.rows).map(|row| self[(row, col)].clone()).collect()
    }

    pub fn select_rows(&self, indices: &[usize]) -> Array2<T>
    where
        T: Clone,
    {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &row in indices {
            data.extend_from_slice(self.row_slice(row));
        }
        Array2 {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let offset = self.offset(index.0, index.1);
        &self.data[offset]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let offset = self.offset(index.0, index.1);
        &mut self.data[offset]
    }
}

#[derive(Debug, Clone)]
pub struct ShapeError {
    rows: usize,
    cols: usize,
    len: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid shape ({}, {}) for buffer of length {}",
            self.rows, self.cols, self.len
        )
    }
}

impl Error for ShapeError {}
