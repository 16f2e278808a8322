//! Integration tests for CLI config parsing and util helpers.

use chrot_cli::cli::build_cli;
use chrot_cli::rotation::inference::input::PredictConfig;
use chrot_cli::rotation::train::input::TrainConfig;
use chrot_cli::rotation::util::validate_tsv_or_csv_file;

fn touch_csv(dir: &std::path::Path, name: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, "TrafficLoad\n1\n").unwrap();
    path.to_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// validate_tsv_or_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_tsv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.tsv");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_ok());
}

#[test]
fn validate_uppercase_csv_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DATA.CSV");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_ok());
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_tsv_or_csv_file("/nonexistent/path/data.csv").is_err());
}

// ---------------------------------------------------------------------------
// TrainConfig
// ---------------------------------------------------------------------------

#[test]
fn train_config_default_values() {
    let cfg = TrainConfig::default();
    assert_eq!(cfg.train_data, "dataset.csv");
    assert_eq!(cfg.updated_data_file, "dataset_updated.csv");
    assert_eq!(cfg.model_path, "ch_rotation_model.pkl");
    assert!((cfg.test_size - 0.3).abs() < 1e-12);
    assert_eq!(cfg.split_seed, 42);
    assert_eq!(cfg.label_noise_seed, None);
    assert_eq!(cfg.forest.n_estimators, 50);
    assert_eq!(cfg.forest.max_depth, Some(5));
    assert_eq!(cfg.forest.random_state, Some(42));
}

#[test]
fn train_config_partial_json_keeps_defaults() {
    let cfg: TrainConfig =
        serde_json::from_str(r#"{"forest": {"n_estimators": 10}, "split_seed": 7}"#).unwrap();
    assert_eq!(cfg.forest.n_estimators, 10);
    assert_eq!(cfg.forest.max_depth, Some(5));
    assert_eq!(cfg.split_seed, 7);
    assert_eq!(cfg.model_path, "ch_rotation_model.pkl");
}

#[test]
fn train_config_round_trips_json() {
    let cfg = TrainConfig::default();
    let json = serde_json::to_string(&cfg).unwrap();
    let cfg2: TrainConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(cfg, cfg2);
}

#[test]
fn train_cli_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let from_file = touch_csv(dir.path(), "from_file.csv");
    let from_cli = touch_csv(dir.path(), "from_cli.csv");
    let config_path = dir.path().join("train.json");
    std::fs::write(
        &config_path,
        serde_json::json!({ "train_data": from_file, "model_path": "file.pkl" }).to_string(),
    )
    .unwrap();

    let matches = build_cli().get_matches_from([
        "chrot",
        "train",
        config_path.to_str().unwrap(),
        "-d",
        from_cli.as_str(),
        "--seed",
        "9",
        "--no-report",
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    let cfg = TrainConfig::from_arguments(Some(&config_path), sub).unwrap();
    assert_eq!(cfg.train_data, from_cli);
    assert_eq!(cfg.model_path, "file.pkl");
    assert_eq!(cfg.label_noise_seed, Some(9));
    assert_eq!(cfg.report_file, None);
}

#[test]
fn train_config_rejects_bad_flip_probability() {
    let dir = tempfile::tempdir().unwrap();
    let data = touch_csv(dir.path(), "dataset.csv");
    let config_path = dir.path().join("train.json");
    std::fs::write(
        &config_path,
        serde_json::json!({ "train_data": data, "label_rule": { "flip_probability": 1.5 } })
            .to_string(),
    )
    .unwrap();

    let matches = build_cli().get_matches_from(["chrot", "train"]);
    let (_, sub) = matches.subcommand().unwrap();
    assert!(TrainConfig::from_arguments(Some(&config_path), sub).is_err());
}

// ---------------------------------------------------------------------------
// PredictConfig
// ---------------------------------------------------------------------------

#[test]
fn predict_config_default_values() {
    let cfg = PredictConfig::default();
    assert_eq!(cfg.model_path, "ch_rotation_model.pkl");
    assert_eq!(cfg.inference_data, "newest_dataset.csv");
    assert_eq!(cfg.output_file, "predicted_ch_rotation1.csv");
    assert!(!cfg.include_probability);
}

#[test]
fn predict_config_invalid_field_falls_back_to_default() {
    let partial = serde_json::json!({
        "model_path": "other.pkl",
        "include_probability": "yes please",
    });
    let cfg = PredictConfig::from_json(&partial);
    assert_eq!(cfg.model_path, "other.pkl");
    assert!(!cfg.include_probability);
    assert_eq!(cfg.output_file, "predicted_ch_rotation1.csv");
}

#[test]
fn predict_flag_enables_probability() {
    let dir = tempfile::tempdir().unwrap();
    let data = touch_csv(dir.path(), "new.csv");
    let matches =
        build_cli().get_matches_from(["chrot", "predict", "-d", data.as_str(), "--probability"]);
    let (_, sub) = matches.subcommand().unwrap();
    let cfg = PredictConfig::from_arguments(None, sub).unwrap();
    assert!(cfg.include_probability);
    assert_eq!(cfg.inference_data, data);
}
