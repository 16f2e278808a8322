//! Small row-major matrix type used for feature data.
//!
//! Shared by the CSV layer, the tree models and the tests.
pub mod matrix;

pub use matrix::{Array2, ShapeError};
