use anyhow::{Context, Result};
use chrot_classifiers::config::ForestConfig;
use chrot_classifiers::labeling::LabelRule;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rotation::util::{read_config_json, validate_tsv_or_csv_file};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub version: String,
    pub train_data: String,
    /// Where the dataset is re-written when labels had to be synthesized.
    pub updated_data_file: String,
    pub model_path: String,
    pub report_file: Option<String>,
    pub test_size: f64,
    pub split_seed: u64,
    /// Seed for label noise. `None` draws from OS entropy.
    pub label_noise_seed: Option<u64>,
    pub label_rule: LabelRule,
    pub forest: ForestConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            version: clap::crate_version!().to_string(),
            train_data: String::from("dataset.csv"),
            updated_data_file: String::from("dataset_updated.csv"),
            model_path: String::from("ch_rotation_model.pkl"),
            report_file: Some(String::from("ch_rotation_training_report.html")),
            test_size: 0.3,
            split_seed: 42,
            label_noise_seed: None,
            label_rule: LabelRule::default(),
            forest: ForestConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let value = read_config_json(path)?;
                serde_json::from_value(value)
                    .with_context(|| format!("Invalid training config: {:?}", path))?
            }
            None => {
                log::info!("No config file provided; using built-in defaults.");
                TrainConfig::default()
            }
        };

        // Apply CLI overrides
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        if let Some(model_path) = matches.get_one::<String>("model_path") {
            config.model_path = model_path.clone();
        }
        if let Some(updated_data) = matches.get_one::<String>("updated_data") {
            config.updated_data_file = updated_data.clone();
        }
        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.label_noise_seed = Some(*seed);
        }
        if matches.get_flag("no_report") {
            config.report_file = None;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_tsv_or_csv_file(&self.train_data)?;
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            anyhow::bail!("test_size must be within (0, 1), got {}", self.test_size);
        }
        self.label_rule.validate()?;
        self.forest.validate()?;
        Ok(())
    }
}
