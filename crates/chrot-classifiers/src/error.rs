use std::error::Error;
use std::fmt;

/// Errors raised while fitting or applying a tree ensemble.
#[derive(Debug, Clone, PartialEq)]
pub enum ForestError {
    /// No samples were supplied.
    EmptyDataset,
    /// Feature rows and labels disagree in length (rows, labels).
    LengthMismatch(usize, usize),
    /// The labels contain only one class.
    SingleClass(usize),
    /// A hyper-parameter is out of range.
    InvalidParameter(String),
    /// Sample width does not match the fitted model (expected, got).
    FeatureCountMismatch(usize, usize),
    /// Prediction was requested before `fit`.
    NotFitted,
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ForestError::EmptyDataset => write!(f, "Cannot fit a model on an empty dataset"),
            ForestError::LengthMismatch(rows, labels) => write!(
                f,
                "Feature matrix has {} rows but {} labels were given",
                rows, labels
            ),
            ForestError::SingleClass(class) => write!(
                f,
                "Labels contain a single class ({}); at least two classes are required",
                class
            ),
            ForestError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ForestError::FeatureCountMismatch(expected, got) => write!(
                f,
                "Model expects {} features but samples have {}",
                expected, got
            ),
            ForestError::NotFitted => write!(f, "Model has not been fitted"),
        }
    }
}

impl Error for ForestError {}
