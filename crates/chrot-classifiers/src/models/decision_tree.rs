//! CART decision tree classifier.
//!
//! Nodes live in a flat array; node `0` is the root and split nodes store the
//! indices of their children. Splits minimise weighted Gini impurity and send
//! samples with `value <= threshold` to the left child. Leaves keep the
//! weighted class distribution of the training samples that reached them, so
//! the tree can report probabilities as well as hard labels.
//!
//! Trees are normally grown by [`RandomForest`](super::random_forest::RandomForest)
//! through [`DecisionTree::fit_weighted`], which supplies bootstrap/class
//! weights and a per-tree RNG. The [`ClassifierModel`] impl fits a single tree
//! with uniform weights.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::MaxFeatures;
use crate::error::ForestError;
use crate::math::Array2;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::check_training_data;

const IMPURITY_EPSILON: f64 = 1e-12;

/// Growth limits for a single tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub random_state: Option<u64>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            random_state: None,
        }
    }
}

/// A node in the decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        /// Feature index to split on.
        feature: usize,
        /// Features `<= threshold` go left.
        threshold: f32,
        left: usize,
        right: usize,
        n_samples: usize,
    },
    Leaf {
        /// Weighted class distribution, sums to 1.
        proba: Vec<f32>,
        n_samples: usize,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f32,
    improvement: f64,
}

struct GrowContext<'a> {
    x: &'a Array2<f32>,
    y: &'a [usize],
    weights: &'a [f64],
}

/// A decision tree classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    params: TreeParams,
    nodes: Vec<TreeNode>,
    n_features: usize,
    n_classes: usize,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            n_features: 0,
            n_classes: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Grow the tree on weighted samples.
    ///
    /// Rows with a zero weight do not take part in the fit. `n_classes` must
    /// be larger than every label in `y`.
    pub fn fit_weighted(
        &mut self,
        x: &Array2<f32>,
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        rng: &mut StdRng,
    ) -> Result<(), ForestError> {
        if x.nrows() != y.len() || weights.len() != y.len() {
            return Err(ForestError::LengthMismatch(x.nrows(), y.len()));
        }
        if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ForestError::InvalidParameter(format!(
                "label {} is outside of 0..{}",
                label, n_classes
            )));
        }
        let indices: Vec<usize> = (0..y.len()).filter(|&i| weights[i] > 0.0).collect();
        if indices.is_empty() {
            return Err(ForestError::EmptyDataset);
        }

        self.nodes.clear();
        self.n_features = x.ncols();
        self.n_classes = n_classes;
        self.feature_importances = vec![0.0; x.ncols()];

        let ctx = GrowContext { x, y, weights };
        self.grow(&ctx, indices, 0, rng);

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for v in self.feature_importances.iter_mut() {
                *v /= total;
            }
        }
        Ok(())
    }

    fn grow(
        &mut self,
        ctx: &GrowContext<'_>,
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let mut counts = vec![0.0f64; self.n_classes];
        let mut total = 0.0f64;
        for &i in &indices {
            counts[ctx.y[i]] += ctx.weights[i];
            total += ctx.weights[i];
        }

        let depth_reached = self.params.max_depth.map_or(false, |max| depth >= max);
        let too_small = indices.len() < self.params.min_samples_split
            || indices.len() < 2 * self.params.min_samples_leaf;
        if depth_reached || too_small || gini(&counts, total) <= IMPURITY_EPSILON {
            return self.push_leaf(&counts, total, indices.len());
        }

        let Some(split) = self.best_split(ctx, &indices, &counts, total, rng) else {
            return self.push_leaf(&counts, total, indices.len());
        };
        self.feature_importances[split.feature] += split.improvement;

        let n_samples = indices.len();
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| ctx.x[(i, split.feature)] <= split.threshold);

        let node_id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            proba: Vec::new(),
            n_samples,
        });
        let left = self.grow(ctx, left_rows, depth + 1, rng);
        let right = self.grow(ctx, right_rows, depth + 1, rng);
        self.nodes[node_id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples,
        };
        node_id
    }

    fn push_leaf(&mut self, counts: &[f64], total: f64, n_samples: usize) -> usize {
        let proba = counts
            .iter()
            .map(|&c| if total > 0.0 { (c / total) as f32 } else { 0.0 })
            .collect();
        self.nodes.push(TreeNode::Leaf { proba, n_samples });
        self.nodes.len() - 1
    }

    /// Search a random subset of features for the split with the largest
    /// weighted impurity decrease. More than `max_features` features are
    /// inspected when none of the first ones yields a valid split.
    fn best_split(
        &self,
        ctx: &GrowContext<'_>,
        indices: &[usize],
        counts: &[f64],
        total: f64,
        rng: &mut StdRng,
    ) -> Option<Split> {
        let parent = total * gini(counts, total);
        let max_features = self.params.max_features.resolve(self.n_features);
        let min_leaf = self.params.min_samples_leaf;

        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let mut best: Option<Split> = None;
        let mut column: Vec<(f32, usize)> = Vec::with_capacity(indices.len());
        let mut left = vec![0.0f64; self.n_classes];

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= max_features && best.is_some() {
                break;
            }
            column.clear();
            column.extend(indices.iter().map(|&i| (ctx.x[(i, feature)], i)));
            column.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            if column[0].0 >= column[column.len() - 1].0 {
                continue;
            }

            left.iter_mut().for_each(|v| *v = 0.0);
            let mut left_total = 0.0f64;
            for pos in 0..column.len() - 1 {
                let (value, row) = column[pos];
                left[ctx.y[row]] += ctx.weights[row];
                left_total += ctx.weights[row];

                let next = column[pos + 1].0;
                if next <= value {
                    continue;
                }
                let n_left = pos + 1;
                if n_left < min_leaf || column.len() - n_left < min_leaf {
                    continue;
                }

                let right_total = total - left_total;
                let mut right_sq = 0.0f64;
                for (c, l) in counts.iter().zip(left.iter()) {
                    right_sq += (c - l) * (c - l);
                }
                let left_impurity = left_total * gini(&left, left_total);
                let right_impurity = if right_total > 0.0 {
                    right_total - right_sq / right_total
                } else {
                    0.0
                };
                let improvement = parent - left_impurity - right_impurity;

                if improvement > best.map_or(IMPURITY_EPSILON, |b| b.improvement) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        improvement,
                    });
                }
            }
        }
        best
    }

    /// Class distribution of the leaf reached by one sample.
    pub fn predict_proba_row(&self, features: &[f32]) -> &[f32] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { proba, .. } => return proba,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_at(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    /// Normalized impurity decrease per feature (all zeros for a single leaf).
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        self.node_depth(0)
    }

    fn node_depth(&self, idx: usize) -> usize {
        match &self.nodes[idx] {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => {
                1 + self.node_depth(*left).max(self.node_depth(*right))
            }
        }
    }
}

impl ClassifierModel for DecisionTree {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<(), ForestError> {
        let n_classes = check_training_data(x, y)?;
        let weights = vec![1.0; y.len()];
        let mut rng = match self.params.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.fit_weighted(x, y, &weights, n_classes, &mut rng)
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, ForestError> {
        if !self.is_fitted() {
            return Err(ForestError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(ForestError::FeatureCountMismatch(self.n_features, x.ncols()));
        }
        let mut data = Vec::with_capacity(x.nrows() * self.n_classes);
        for row in x.rows() {
            data.extend_from_slice(self.predict_proba_row(row));
        }
        Array2::from_shape_vec((x.nrows(), self.n_classes), data)
            .map_err(|e| ForestError::InvalidParameter(e.to_string()))
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

/// Gini impurity of a weighted class histogram.
fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|&c| (c / total) * (c / total)).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold_data() -> (Array2<f32>, Vec<usize>) {
        // f[0] <= 0.5 → class 0, else → class 1; f[1] is noise
        let x = Array2::from_rows(vec![
            vec![0.1, 3.0],
            vec![0.2, 1.0],
            vec![0.4, 2.0],
            vec![0.6, 3.0],
            vec![0.8, 1.0],
            vec![0.9, 2.0],
        ])
        .unwrap();
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn learns_single_threshold() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeParams {
            random_state: Some(7),
            ..TreeParams::default()
        });
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        match tree.node_at(0) {
            TreeNode::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert!((*threshold - 0.5).abs() < 1e-6);
            }
            TreeNode::Leaf { .. } => panic!("root should split"),
        }
        assert_eq!(tree.feature_importances(), &[1.0, 0.0]);
    }

    #[test]
    fn boundary_value_goes_left() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();
        let TreeNode::Split { threshold, .. } = tree.node_at(0).clone() else {
            panic!("root should split");
        };
        assert_eq!(tree.predict_proba_row(&[threshold, 0.0]), &[1.0, 0.0]);
        assert_eq!(tree.predict_proba_row(&[threshold + 0.01, 0.0]), &[0.0, 1.0]);
    }

    #[test]
    fn max_depth_limits_growth() {
        // XOR needs depth 2; a stump can only produce a single split.
        let x = Array2::from_rows(vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.1, 0.1],
            vec![0.9, 0.9],
        ])
        .unwrap();
        let y = vec![0, 1, 1, 0, 0, 0];
        let mut stump = DecisionTree::new(TreeParams {
            max_depth: Some(1),
            random_state: Some(1),
            ..TreeParams::default()
        });
        stump.fit(&x, &y).unwrap();
        assert!(stump.depth() <= 1);

        let mut full = DecisionTree::new(TreeParams {
            random_state: Some(1),
            ..TreeParams::default()
        });
        full.fit(&x, &y).unwrap();
        assert_eq!(full.predict(&x).unwrap(), y);
    }

    #[test]
    fn leaf_keeps_weighted_distribution() {
        // Identical features cannot be split, the root stays a leaf.
        let x = Array2::from_rows(vec![vec![1.0], vec![1.0], vec![1.0]]).unwrap();
        let y = vec![0, 1, 1];
        let mut tree = DecisionTree::new(TreeParams::default());
        let mut rng = StdRng::seed_from_u64(0);
        tree.fit_weighted(&x, &y, &[2.0, 1.0, 1.0], 2, &mut rng)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_proba_row(&[1.0]), &[0.5, 0.5]);
    }

    #[test]
    fn zero_weight_rows_are_ignored() {
        let x = Array2::from_rows(vec![vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let y = vec![0, 1, 1];
        let mut tree = DecisionTree::new(TreeParams::default());
        let mut rng = StdRng::seed_from_u64(0);
        tree.fit_weighted(&x, &y, &[0.0, 1.0, 1.0], 2, &mut rng)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_proba_row(&[0.0]), &[0.0, 1.0]);
    }

    #[test]
    fn min_samples_leaf_blocks_small_children() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeParams {
            min_samples_leaf: 4,
            ..TreeParams::default()
        });
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn unfitted_tree_refuses_to_predict() {
        let tree = DecisionTree::new(TreeParams::default());
        let x = Array2::from_rows(vec![vec![1.0]]).unwrap();
        assert_eq!(tree.predict(&x), Err(ForestError::NotFitted));
    }

    #[test]
    fn wrong_width_is_rejected() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();
        let narrow = Array2::from_rows(vec![vec![1.0]]).unwrap();
        assert_eq!(
            tree.predict(&narrow),
            Err(ForestError::FeatureCountMismatch(2, 1))
        );
    }
}
