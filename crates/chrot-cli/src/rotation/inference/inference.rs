use anyhow::{Context, Result};
use chrot_classifiers::io::{load_model, CsvTable};
use chrot_classifiers::models::classifier_trait::ClassifierModel;
use chrot_classifiers::models::utils::argmax;
use chrot_classifiers::stats::value_counts;
use std::collections::BTreeMap;

use crate::rotation::inference::input::PredictConfig;
use crate::rotation::inference::output::append_predictions;

/// Score every row of `inference_data` and write the augmented table.
/// Returns the number of rows per predicted class.
pub fn run_inference(config: &PredictConfig) -> Result<BTreeMap<usize, usize>> {
    log::debug!(
        "Effective inference config:\n{}",
        serde_json::to_string_pretty(config)?
    );

    let artifact = load_model(&config.model_path)?;
    log::info!(
        "Loaded model from {} ({} trees, trained {})",
        config.model_path,
        artifact.forest.n_trees(),
        artifact.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    let mut table = CsvTable::read(&config.inference_data)
        .with_context(|| format!("Failed to load inference data: {}", config.inference_data))?;
    log::info!("Loaded {} rows from {}", table.nrows(), config.inference_data);

    let x = table
        .feature_matrix(&artifact.feature_names)
        .context("Inference data does not match the model's feature columns")?;

    let start_time = std::time::Instant::now();
    let proba = artifact.forest.predict_proba(&x)?;
    let predictions: Vec<usize> = proba.rows().map(argmax).collect();
    log::info!("Inference completed in {:?}", start_time.elapsed());

    let positive_proba: Option<Vec<f32>> = config.include_probability.then(|| {
        proba
            .rows()
            .map(|row| row.get(1).copied().unwrap_or(0.0))
            .collect()
    });
    append_predictions(&mut table, &predictions, positive_proba.as_deref())?;

    table
        .write(&config.output_file)
        .with_context(|| format!("Failed to write predictions: {}", config.output_file))?;
    log::info!("Predictions saved as '{}'", config.output_file);

    let counts = value_counts(&predictions);
    for (class, count) in &counts {
        log::info!("Predicted class {}: {} rows", class, count);
    }
    Ok(counts)
}
