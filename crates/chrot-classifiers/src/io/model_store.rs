//! Persistence of fitted models.
//!
//! A model file is a JSON document holding the fitted forest together with the
//! feature names it was trained on, so inference can select the same columns
//! in the same order.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::random_forest::RandomForest;

/// Bumped whenever the serialized layout changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub crate_version: String,
    pub created_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub label_column: String,
    pub n_classes: usize,
    pub test_accuracy: Option<f64>,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(
        forest: RandomForest,
        feature_names: Vec<String>,
        label_column: &str,
        test_accuracy: Option<f64>,
    ) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            n_classes: forest.n_classes(),
            feature_names,
            label_column: label_column.to_string(),
            test_accuracy,
            forest,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            bail!(
                "Unsupported model format version {} (expected {})",
                self.format_version,
                MODEL_FORMAT_VERSION
            );
        }
        if self.forest.n_trees() == 0 {
            bail!("Model file contains an unfitted forest");
        }
        if self.forest.n_features() != self.feature_names.len() {
            bail!(
                "Model expects {} features but lists {} feature names",
                self.forest.n_features(),
                self.feature_names.len()
            );
        }
        Ok(())
    }
}

pub fn save_model<P: AsRef<Path>>(path: P, artifact: &ModelArtifact) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create model file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, artifact)
        .with_context(|| format!("Failed to serialize model to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ModelArtifact> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open model file: {}", path.display()))?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse model file: {}", path.display()))?;
    artifact.validate()?;
    Ok(artifact)
}
