//! Feature/label contract and dataset helpers.
//!
//! Defines the column names shared by training and inference, the `Dataset`
//! container and the seeded train/test split used before fitting.
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::io::CsvTable;
use crate::math::Array2;
use crate::stats::value_counts;

/// Feature columns, in the order the model consumes them.
pub const FEATURE_COLUMNS: [&str; 4] = [
    "TrafficLoad",
    "PacketReceived",
    "ResidualEnergy",
    "DistanceToBS",
];

/// Binary rotation label (1 = rotate the cluster head).
pub const LABEL_COLUMN: &str = "OptimalCHRotation";

/// Column appended by inference.
pub const PREDICTION_COLUMN: &str = "Predicted_CH_Rotation";

/// Optional column with the probability of class 1.
pub const PROBABILITY_COLUMN: &str = "Predicted_CH_Rotation_Probability";

pub fn default_feature_names() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub x: Array2<f32>,
    pub y: Vec<usize>,
    pub feature_names: Vec<String>,
}

impl Dataset {
    pub fn new(x: Array2<f32>, y: Vec<usize>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            bail!(
                "Feature matrix has {} rows but {} labels were given",
                x.nrows(),
                y.len()
            );
        }
        if x.ncols() != feature_names.len() {
            bail!(
                "Feature matrix has {} columns but {} feature names were given",
                x.ncols(),
                feature_names.len()
            );
        }
        Ok(Self {
            x,
            y,
            feature_names,
        })
    }

    /// Select the feature columns and the label column from a loaded table.
    pub fn from_table(table: &CsvTable, feature_names: &[String], label_column: &str) -> Result<Self> {
        let x = table.feature_matrix(feature_names)?;
        let y = table.label_vector(label_column)?;
        Self::new(x, y, feature_names.to_vec())
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select_rows(indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Shuffle and split into `(train, test)`; see [`split_indices`].
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        let (train_idx, test_idx) = split_indices(self.len(), test_size, seed)?;
        Ok((self.select(&train_idx), self.select(&test_idx)))
    }

    pub fn log_input_data_summary(&self) {
        log::info!("----- Input Data Summary -----");
        log::info!("{} rows, {} feature columns", self.len(), self.x.ncols());
        for (class, count) in value_counts(&self.y) {
            log::info!("label {}: {}", class, count);
        }
        log::info!("-------------------------------");
    }
}

/// Seeded shuffle split returning `(train_indices, test_indices)`.
///
/// The test partition holds `ceil(test_size * n)` rows taken from the front of
/// a seeded permutation, the training partition holds the rest. The same seed
/// always assigns the same rows to the same partition.
pub fn split_indices(n: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        bail!("test_size must be in (0, 1), got {}", test_size);
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        bail!(
            "Cannot split {} rows with test_size {}: both partitions must be non-empty",
            n,
            test_size
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut permutation: Vec<usize> = (0..n).collect();
    permutation.shuffle(&mut rng);

    let train = permutation[n_test..].to_vec();
    let test = permutation[..n_test].to_vec();
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seventy_thirty_sizes() {
        let (train, test) = split_indices(10, 0.3, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);

        let (train, test) = split_indices(11, 0.3, 42).unwrap();
        assert_eq!(test.len(), 4);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn split_is_a_partition() {
        let (mut train, test) = split_indices(50, 0.3, 42).unwrap();
        train.extend(test);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn split_rejects_degenerate_sizes() {
        assert!(split_indices(1, 0.3, 42).is_err());
        assert!(split_indices(10, 0.0, 42).is_err());
        assert!(split_indices(10, 1.0, 42).is_err());
    }

    #[test]
    fn dataset_shape_is_checked() {
        let x = Array2::from_shape_vec((2, 1), vec![1.0, 2.0]).unwrap();
        assert!(Dataset::new(x.clone(), vec![0], vec!["a".into()]).is_err());
        assert!(Dataset::new(x.clone(), vec![0, 1], vec![]).is_err());
        assert!(Dataset::new(x, vec![0, 1], vec!["a".into()]).is_ok());
    }
}
