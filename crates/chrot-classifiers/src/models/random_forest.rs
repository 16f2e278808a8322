//! Random Forest classifier.
//!
//! Ensemble of [`DecisionTree`]s, each grown on a bootstrap sample with a
//! random feature subset considered at every split. Predictions average the
//! per-tree class distributions (soft voting).
//!
//! # Determinism
//!
//! One base seed (`random_state`, or entropy when unset) produces a seed per
//! tree before any tree is grown. Every tree therefore sees the same random
//! stream whether the forest is fitted sequentially or on a rayon pool.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ForestConfig;
use crate::error::ForestError;
use crate::math::Array2;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::decision_tree::{DecisionTree, TreeParams};
use crate::models::utils::{argmax, check_training_data, class_weights};

/// A fitted (or empty) random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
    feature_importances: Vec<f64>,
}

/// Result of Random Forest prediction with vote details.
#[derive(Debug, Clone, PartialEq)]
pub struct RfPrediction {
    /// Predicted class (highest mean probability).
    pub class: usize,
    /// Hard vote count per class.
    pub votes: Vec<usize>,
    /// Mean probability of the predicted class across trees.
    pub confidence: f32,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            n_classes: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    fn fit_tree(
        &self,
        x: &Array2<f32>,
        y: &[usize],
        weights_by_class: &[f64],
        n_classes: usize,
        seed: u64,
    ) -> Result<DecisionTree, ForestError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = y.len();

        let mut multiplicity = vec![0u32; n];
        if self.config.bootstrap {
            for _ in 0..n {
                multiplicity[rng.gen_range(0..n)] += 1;
            }
        } else {
            multiplicity.iter_mut().for_each(|m| *m = 1);
        }
        let weights: Vec<f64> = (0..n)
            .map(|i| weights_by_class[y[i]] * multiplicity[i] as f64)
            .collect();

        let mut tree = DecisionTree::new(TreeParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self.config.max_features,
            random_state: Some(seed),
        });
        tree.fit_weighted(x, y, &weights, n_classes, &mut rng)?;
        Ok(tree)
    }

    fn check_input(&self, x: &Array2<f32>) -> Result<(), ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(ForestError::FeatureCountMismatch(self.n_features, x.ncols()));
        }
        Ok(())
    }

    /// Mean class distribution over all trees for one sample.
    pub fn predict_proba_row(&self, features: &[f32]) -> Vec<f32> {
        let mut proba = vec![0.0f32; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba_row(features)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len().max(1) as f32;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }

    /// Predict a single sample with vote details.
    pub fn predict_with_votes(&self, features: &[f32]) -> Result<RfPrediction, ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NotFitted);
        }
        if features.len() != self.n_features {
            return Err(ForestError::FeatureCountMismatch(
                self.n_features,
                features.len(),
            ));
        }
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[argmax(tree.predict_proba_row(features))] += 1;
        }
        let proba = self.predict_proba_row(features);
        let class = argmax(&proba);
        Ok(RfPrediction {
            class,
            votes,
            confidence: proba[class],
        })
    }

    /// Individual tree predictions for a single sample (useful for debugging).
    pub fn tree_predictions(&self, features: &[f32]) -> Vec<usize> {
        self.trees
            .iter()
            .map(|t| argmax(t.predict_proba_row(features)))
            .collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn tree_at(&self, index: usize) -> &DecisionTree {
        &self.trees[index]
    }

    /// Mean normalized impurity decrease per feature, summing to 1 when any
    /// tree has a split. Single-leaf trees do not contribute.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn avg_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: usize = self.trees.iter().map(DecisionTree::depth).sum();
        total as f64 / self.trees.len() as f64
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::n_nodes).sum()
    }

    fn aggregate_importances(&mut self) {
        let mut sums = vec![0.0f64; self.n_features];
        for tree in self.trees.iter().filter(|t| t.n_nodes() > 1) {
            for (acc, v) in sums.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        let total: f64 = sums.iter().sum();
        if total > 0.0 {
            sums.iter_mut().for_each(|v| *v /= total);
        }
        self.feature_importances = sums;
    }
}

impl ClassifierModel for RandomForest {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<(), ForestError> {
        self.config.validate()?;
        let n_classes = check_training_data(x, y)?;
        let weights_by_class = class_weights(y, n_classes, self.config.class_weight);

        let base_seed = self.config.random_state.unwrap_or_else(rand::random);
        let mut seeder = StdRng::seed_from_u64(base_seed);
        let seeds: Vec<u64> = (0..self.config.n_estimators)
            .map(|_| seeder.gen())
            .collect();

        let trees = match self.config.n_jobs {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ForestError::InvalidParameter(e.to_string()))?;
                pool.install(|| {
                    seeds
                        .par_iter()
                        .map(|&seed| self.fit_tree(x, y, &weights_by_class, n_classes, seed))
                        .collect::<Result<Vec<_>, _>>()
                })?
            }
            None => seeds
                .iter()
                .map(|&seed| self.fit_tree(x, y, &weights_by_class, n_classes, seed))
                .collect::<Result<Vec<_>, _>>()?,
        };

        log::debug!(
            "Fitted {} trees on {} samples ({} classes)",
            trees.len(),
            y.len(),
            n_classes
        );

        self.trees = trees;
        self.n_features = x.ncols();
        self.n_classes = n_classes;
        self.aggregate_importances();
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, ForestError> {
        self.check_input(x)?;
        let mut data = Vec::with_capacity(x.nrows() * self.n_classes);
        for row in x.rows() {
            data.extend(self.predict_proba_row(row));
        }
        Array2::from_shape_vec((x.nrows(), self.n_classes), data)
            .map_err(|e| ForestError::InvalidParameter(e.to_string()))
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
