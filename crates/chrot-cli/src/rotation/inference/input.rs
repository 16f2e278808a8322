use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rotation::util::{read_config_json, validate_tsv_or_csv_file};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PredictConfig {
    pub version: String,
    pub model_path: String,
    pub inference_data: String,
    pub output_file: String,
    pub include_probability: bool,
}

impl Default for PredictConfig {
    fn default() -> Self {
        PredictConfig {
            version: clap::crate_version!().to_string(),
            model_path: String::from("ch_rotation_model.pkl"),
            inference_data: String::from("newest_dataset.csv"),
            output_file: String::from("predicted_ch_rotation1.csv"),
            include_probability: false,
        }
    }
}

impl PredictConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => PredictConfig::from_json(&read_config_json(path)?),
            None => {
                log::info!("No config file provided; using built-in defaults.");
                PredictConfig::default()
            }
        };

        // Apply CLI overrides
        if let Some(model_path) = matches.get_one::<String>("model_path") {
            config.model_path = model_path.clone();
        }
        if let Some(inference_data) = matches.get_one::<String>("inference_data") {
            config.inference_data = inference_data.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        if matches.get_flag("probability") {
            config.include_probability = true;
        }

        validate_tsv_or_csv_file(&config.inference_data)?;
        Ok(config)
    }

    /// Field-by-field load: a missing or malformed field keeps its default.
    pub fn from_json(partial: &serde_json::Value) -> Self {
        let mut config = PredictConfig::default();

        macro_rules! load_or_default {
            ($field:ident) => {
                if let Some(val) = partial.get(stringify!($field)) {
                    if let Ok(parsed) = serde_json::from_value(val.clone()) {
                        config.$field = parsed;
                    } else {
                        log::warn!(
                            "Config Invalid value for '{}', using default: {:?}",
                            stringify!($field), config.$field
                        );
                    }
                } else {
                    log::warn!(
                        "Config Missing field '{}', using default: {:?}",
                        stringify!($field), config.$field
                    );
                }
            };
        }

        load_or_default!(model_path);
        load_or_default!(inference_data);
        load_or_default!(output_file);
        load_or_default!(include_probability);

        config
    }
}
