use std::collections::BTreeSet;

use crate::config::ClassWeight;
use crate::error::ForestError;
use crate::math::Array2;

/// Validate a training set and return the number of classes (`max(y) + 1`).
pub fn check_training_data(x: &Array2<f32>, y: &[usize]) -> Result<usize, ForestError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ForestError::EmptyDataset);
    }
    if x.nrows() != y.len() {
        return Err(ForestError::LengthMismatch(x.nrows(), y.len()));
    }
    let distinct: BTreeSet<usize> = y.iter().copied().collect();
    if distinct.len() < 2 {
        return Err(ForestError::SingleClass(y[0]));
    }
    Ok(distinct.iter().next_back().map_or(0, |&c| c + 1))
}

/// Per-class weights. Classes absent from `y` get weight 0.
pub fn class_weights(y: &[usize], n_classes: usize, mode: ClassWeight) -> Vec<f64> {
    match mode {
        ClassWeight::Uniform => vec![1.0; n_classes],
        ClassWeight::Balanced => {
            let counts = class_counts(y, n_classes);
            let present = counts.iter().filter(|&&c| c > 0).count() as f64;
            counts
                .iter()
                .map(|&c| {
                    if c == 0 {
                        0.0
                    } else {
                        y.len() as f64 / (present * c as f64)
                    }
                })
                .collect()
        }
    }
}

pub fn class_counts(y: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        if label < n_classes {
            counts[label] += 1;
        }
    }
    counts
}

/// Index of the largest value, first one wins on ties.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
