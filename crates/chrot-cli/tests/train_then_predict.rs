//! Runs `chrot train` followed by `chrot predict` with the default file names.

use assert_cmd::Command;
use chrot_classifiers::io::{load_model, CsvTable};
use predicates::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;
use std::path::Path;

const HEADER: &str = "NodeID,TrafficLoad,PacketReceived,ResidualEnergy,DistanceToBS";

fn write_sensor_rows(path: &Path, n: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut body = String::from(HEADER);
    body.push('\n');
    for id in 0..n {
        writeln!(
            body,
            "{},{:.1},{:.1},{:.2},{:.1}",
            id,
            rng.gen_range(0.0..5000.0),
            rng.gen_range(0.0..5000.0),
            rng.gen_range(0.0..100.0),
            rng.gen_range(0.0..200.0)
        )
        .unwrap();
    }
    std::fs::write(path, body).unwrap();
}

fn chrot(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chrot").unwrap();
    cmd.current_dir(dir).env("CHROT_LOG", "info");
    cmd
}

#[test]
fn default_file_names_flow_from_training_to_inference() {
    let dir = tempfile::tempdir().unwrap();
    write_sensor_rows(&dir.path().join("dataset.csv"), 300, 1);
    write_sensor_rows(&dir.path().join("newest_dataset.csv"), 40, 2);

    chrot(dir.path())
        .args(["train", "--seed", "5"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Creating synthetic labels"))
        .stderr(predicate::str::contains("Model Accuracy: 0."));

    // Labels were synthesized, so the augmented dataset is written too.
    let updated = CsvTable::read(dir.path().join("dataset_updated.csv")).unwrap();
    assert_eq!(updated.nrows(), 300);
    assert_eq!(
        updated.headers().last().map(String::as_str),
        Some("OptimalCHRotation")
    );

    let artifact = load_model(dir.path().join("ch_rotation_model.pkl")).unwrap();
    assert_eq!(artifact.forest.n_trees(), 50);
    assert_eq!(
        artifact.feature_names,
        ["TrafficLoad", "PacketReceived", "ResidualEnergy", "DistanceToBS"]
    );
    assert!(artifact.test_accuracy.unwrap() > 0.7);

    let report = std::fs::read_to_string(dir.path().join("ch_rotation_training_report.html"))
        .unwrap();
    assert!(report.contains("Feature Importances"));

    chrot(dir.path())
        .args(["predict", "--probability"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Predictions saved"));

    let input = CsvTable::read(dir.path().join("newest_dataset.csv")).unwrap();
    let output = CsvTable::read(dir.path().join("predicted_ch_rotation1.csv")).unwrap();
    assert_eq!(output.nrows(), input.nrows());
    assert_eq!(output.ncols(), input.ncols() + 2);
    assert_eq!(&output.headers()[..input.ncols()], input.headers());
    for (out_row, in_row) in output.rows().iter().zip(input.rows()) {
        assert_eq!(&out_row[..in_row.len()], in_row.as_slice());
    }
    assert!(output
        .column("Predicted_CH_Rotation")
        .unwrap()
        .iter()
        .all(|v| *v == "0" || *v == "1"));
}

#[test]
fn labelled_dataset_is_not_rewritten_and_report_can_be_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = String::from("TrafficLoad,PacketReceived,ResidualEnergy,DistanceToBS,OptimalCHRotation\n");
    for i in 0..60 {
        let energy = (i * 7 % 100) as f32;
        let label = usize::from(energy < 40.0);
        writeln!(body, "1500,2500,{},50,{}", energy, label).unwrap();
    }
    std::fs::write(dir.path().join("train.csv"), body).unwrap();

    chrot(dir.path())
        .args(["train", "-d", "train.csv", "-o", "model.json", "--no-report"])
        .assert()
        .success();

    assert!(dir.path().join("model.json").exists());
    assert!(!dir.path().join("dataset_updated.csv").exists());
    assert!(!dir.path().join("ch_rotation_training_report.html").exists());
}

#[test]
fn inference_without_feature_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_sensor_rows(&dir.path().join("dataset.csv"), 100, 3);
    chrot(dir.path())
        .args(["train", "--no-report"])
        .assert()
        .success();

    std::fs::write(
        dir.path().join("newest_dataset.csv"),
        "TrafficLoad,PacketReceived,DistanceToBS\n1,2,3\n",
    )
    .unwrap();
    chrot(dir.path())
        .arg("predict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ResidualEnergy"));
    assert!(!dir.path().join("predicted_ch_rotation1.csv").exists());
}
