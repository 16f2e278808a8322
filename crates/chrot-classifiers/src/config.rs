use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ForestError;

/// How per-class sample weights are derived before fitting.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample has weight 1.
    Uniform,
    /// `n_samples / (n_classes * count_c)`, so each class carries equal total weight.
    Balanced,
}

impl FromStr for ClassWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" | "none" => Ok(ClassWeight::Uniform),
            "balanced" => Ok(ClassWeight::Balanced),
            _ => Err(format!("Unknown class weight: {}", s)),
        }
    }
}

/// Number of features examined at each split.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    All,
    Count(usize),
    Fraction(f64),
}

impl MaxFeatures {
    /// Resolve against the number of available features, never below one.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match *self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(k) => k,
            MaxFeatures::Fraction(f) => (f * n_features as f64) as usize,
        };
        n.clamp(1, n_features.max(1))
    }
}

impl FromStr for MaxFeatures {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqrt" => Ok(MaxFeatures::Sqrt),
            "log2" => Ok(MaxFeatures::Log2),
            "all" => Ok(MaxFeatures::All),
            other => {
                if let Ok(k) = other.parse::<usize>() {
                    Ok(MaxFeatures::Count(k))
                } else if let Ok(f) = other.parse::<f64>() {
                    Ok(MaxFeatures::Fraction(f))
                } else {
                    Err(format!("Unknown max_features value: {}", s))
                }
            }
        }
    }
}

/// Hyper-parameters of a random forest.
///
/// Defaults are the ones used for cluster-head rotation: a shallow, class
/// balanced ensemble of 50 trees with a fixed seed.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub class_weight: ClassWeight,
    pub random_state: Option<u64>,
    /// Fit trees on a rayon pool of this many threads; `None` fits sequentially.
    pub n_jobs: Option<usize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            max_depth: Some(5),
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            class_weight: ClassWeight::Balanced,
            random_state: Some(42),
            n_jobs: None,
        }
    }
}

impl ForestConfig {
    pub fn new(n_estimators: usize, max_depth: Option<usize>) -> Self {
        Self {
            n_estimators,
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if self.n_estimators == 0 {
            return Err(ForestError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ForestError::InvalidParameter(format!(
                    "max_features fraction must be in (0, 1], got {}",
                    f
                )));
            }
        }
        if self.n_jobs == Some(0) {
            return Err(ForestError::InvalidParameter(
                "n_jobs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
