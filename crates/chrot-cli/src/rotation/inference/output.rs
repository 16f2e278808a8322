use anyhow::{bail, Result};
use chrot_classifiers::data_handling::{PREDICTION_COLUMN, PROBABILITY_COLUMN};
use chrot_classifiers::io::CsvTable;

/// Attach predictions (and optionally the class-1 probability) to the input
/// table. Existing prediction columns are overwritten in place.
pub fn append_predictions(
    table: &mut CsvTable,
    predictions: &[usize],
    probabilities: Option<&[f32]>,
) -> Result<()> {
    if predictions.len() != table.nrows() {
        bail!(
            "{} predictions for {} input rows",
            predictions.len(),
            table.nrows()
        );
    }
    table.push_column(
        PREDICTION_COLUMN,
        predictions.iter().map(|p| p.to_string()).collect(),
    )?;
    if let Some(probabilities) = probabilities {
        table.push_column(
            PROBABILITY_COLUMN,
            probabilities.iter().map(|p| format!("{:.4}", p)).collect(),
        )?;
    }
    Ok(())
}
