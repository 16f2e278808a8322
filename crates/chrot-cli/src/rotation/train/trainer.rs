use anyhow::{Context, Result};
use chrot_classifiers::data_handling::{default_feature_names, Dataset, LABEL_COLUMN};
use chrot_classifiers::io::{save_model, CsvTable, ModelArtifact};
use chrot_classifiers::labeling::synthesize_labels;
use chrot_classifiers::models::classifier_trait::ClassifierModel;
use chrot_classifiers::models::random_forest::RandomForest;
use chrot_classifiers::stats::{value_counts, ConfusionMatrix};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::input::TrainConfig;
use super::report::write_training_report;

/// What a training run produced, for callers that want more than the log.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub n_rows: usize,
    pub labels_synthesized: bool,
    pub label_counts: BTreeMap<usize, usize>,
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
}

pub fn run_training(config: &TrainConfig) -> Result<TrainingOutcome> {
    log::debug!(
        "Effective training config:\n{}",
        serde_json::to_string_pretty(config)?
    );

    let mut table = CsvTable::read(&config.train_data)
        .with_context(|| format!("Failed to load training data: {}", config.train_data))?;
    log::info!("Loaded {} rows from {}", table.nrows(), config.train_data);

    let labels_synthesized = !table.has_column(LABEL_COLUMN);
    if labels_synthesized {
        log::info!(
            "'{}' column not found. Creating synthetic labels...",
            LABEL_COLUMN
        );
        let mut rng = match config.label_noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let labels = synthesize_labels(&table, &config.label_rule, &mut rng)?;
        table.push_column(
            LABEL_COLUMN,
            labels.iter().map(|label| label.to_string()).collect(),
        )?;
        table.write(&config.updated_data_file).with_context(|| {
            format!("Failed to write updated dataset: {}", config.updated_data_file)
        })?;
        log::info!(
            "Updated dataset with labels saved as '{}'",
            config.updated_data_file
        );
    }

    let feature_names = default_feature_names();
    let dataset = Dataset::from_table(&table, &feature_names, LABEL_COLUMN)?;
    dataset.log_input_data_summary();

    let label_counts = value_counts(&dataset.y);

    let (train, test) = dataset.train_test_split(config.test_size, config.split_seed)?;
    log::info!(
        "Split into {} training and {} test rows (seed {})",
        train.len(),
        test.len(),
        config.split_seed
    );

    let start_time = std::time::Instant::now();
    let mut forest = RandomForest::new(config.forest.clone());
    forest
        .fit(&train.x, &train.y)
        .context("Failed to train random forest")?;
    log::info!(
        "Trained {} trees in {:?} (avg depth {:.2}, {} nodes)",
        forest.n_trees(),
        start_time.elapsed(),
        forest.avg_depth(),
        forest.total_nodes()
    );

    let predictions = forest.predict(&test.x)?;
    let confusion = ConfusionMatrix::new(&test.y, &predictions, forest.n_classes());
    let accuracy = confusion.accuracy();
    log::info!("Model Accuracy: {:.2}", accuracy);
    log_confusion(&confusion);

    let artifact = ModelArtifact::new(forest, feature_names, LABEL_COLUMN, Some(accuracy));
    save_model(&config.model_path, &artifact)?;
    log::info!("Model saved as '{}'", config.model_path);

    if let Some(report_file) = &config.report_file {
        write_training_report(config, &artifact, &label_counts, &confusion, report_file)?;
        log::info!("Training report written to {}", report_file);
    }

    Ok(TrainingOutcome {
        n_rows: dataset.len(),
        labels_synthesized,
        label_counts,
        confusion,
        accuracy,
    })
}

fn log_confusion(confusion: &ConfusionMatrix) {
    for actual in 0..confusion.n_classes() {
        let row: Vec<String> = (0..confusion.n_classes())
            .map(|predicted| confusion.get(actual, predicted).to_string())
            .collect();
        log::info!("Confusion [actual {}]: {}", actual, row.join(" "));
    }
    for class in 0..confusion.n_classes() {
        log::debug!(
            "Class {}: precision {}, recall {}",
            class,
            format_rate(confusion.precision(class)),
            format_rate(confusion.recall(class))
        );
    }
}

pub(crate) fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| String::from("n/a"), |r| format!("{:.3}", r))
}
