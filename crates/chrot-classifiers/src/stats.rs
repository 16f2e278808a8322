//! Classification metrics.
use std::collections::BTreeMap;

/// Count occurrences of each label, ordered by label.
pub fn value_counts(labels: &[usize]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Fraction of predictions equal to the truth.
///
/// Panics if the slices differ in length. Returns 0 for empty input.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "accuracy requires equal lengths"
    );
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Rows are true classes, columns predicted classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Self {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "confusion matrix requires equal lengths"
        );
        let n = y_true
            .iter()
            .chain(y_pred)
            .map(|&c| c + 1)
            .max()
            .unwrap_or(0)
            .max(n_classes);
        let mut counts = vec![vec![0usize; n]; n];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[t][p] += 1;
        }
        Self { counts }
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual][predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let diagonal: usize = (0..self.n_classes()).map(|c| self.counts[c][c]).sum();
        diagonal as f64 / total as f64
    }

    /// `None` when the class was never predicted.
    pub fn precision(&self, class: usize) -> Option<f64> {
        let predicted: usize = self.counts.iter().map(|row| row[class]).sum();
        (predicted > 0).then(|| self.counts[class][class] as f64 / predicted as f64)
    }

    /// `None` when the class never occurs.
    pub fn recall(&self, class: usize) -> Option<f64> {
        let actual: usize = self.counts[class].iter().sum();
        (actual > 0).then(|| self.counts[class][class] as f64 / actual as f64)
    }
}
