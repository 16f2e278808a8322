use crate::error::ForestError;
use crate::math::Array2;
use crate::models::utils::argmax;

/// Fit/predict contract shared by the tree models.
pub trait ClassifierModel {
    /// Fit the model. Labels are class indices `0..n_classes`.
    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<(), ForestError>;

    /// Class membership probabilities, one row per sample and one column per class.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, ForestError>;

    /// Most probable class per sample. Ties resolve to the lowest class index.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>, ForestError> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().map(argmax).collect())
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
