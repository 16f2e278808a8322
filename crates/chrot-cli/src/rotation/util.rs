use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

/// Read a JSON config file into a loosely typed value.
pub fn read_config_json(config_path: &Path) -> Result<serde_json::Value> {
    let config_json = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
    serde_json::from_str(&config_json)
        .with_context(|| format!("Config file is not valid JSON: {:?}", config_path))
}
