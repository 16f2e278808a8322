use anyhow::{anyhow, Result};
use chrot_classifiers::io::ModelArtifact;
use chrot_classifiers::report::plots::{plot_feature_importances, plot_label_distribution};
use chrot_classifiers::report::{Report, ReportSection};
use chrot_classifiers::stats::ConfusionMatrix;
use maud::html;
use std::collections::BTreeMap;

use super::input::TrainConfig;
use super::trainer::format_rate;

pub fn write_training_report(
    config: &TrainConfig,
    artifact: &ModelArtifact,
    label_counts: &BTreeMap<usize, usize>,
    confusion: &ConfusionMatrix,
    path: &str,
) -> Result<()> {
    let mut report = Report::new(
        "chrot",
        &config.version,
        "Cluster-Head Rotation Training Report",
    );

    /* Section 1: Overview */
    {
        let mut overview_section = ReportSection::new("Overview");
        let n_rows: usize = label_counts.values().sum();
        overview_section.add_content(html! {
            table {
                tr { td { "Training data" } td { (config.train_data) } }
                tr { td { "Rows" } td { (n_rows) } }
                tr { td { "Classes" } td { (artifact.n_classes) } }
                tr { td { "Trees" } td { (artifact.forest.n_trees()) } }
                tr { td { "Test accuracy" } td { (format_rate(artifact.test_accuracy)) } }
                tr { td { "Created" } td { (artifact.created_at.to_rfc3339()) } }
            }
        });
        overview_section.add_plot(plot_label_distribution(label_counts, "Label Distribution"));
        report.add_section(overview_section);
    }

    /* Section 2: Evaluation */
    {
        let mut eval_section = ReportSection::new("Evaluation");
        let classes: Vec<usize> = (0..confusion.n_classes()).collect();
        eval_section.add_content(html! {
            table {
                tr {
                    th { "actual \\ predicted" }
                    @for c in &classes { th { (c) } }
                    th { "precision" }
                    th { "recall" }
                }
                @for actual in &classes {
                    tr {
                        th { (actual) }
                        @for predicted in &classes {
                            td { (confusion.get(*actual, *predicted)) }
                        }
                        td { (format_rate(confusion.precision(*actual))) }
                        td { (format_rate(confusion.recall(*actual))) }
                    }
                }
            }
        });
        let importance_plot =
            plot_feature_importances(&artifact.feature_names, artifact.forest.feature_importances())
                .map_err(|e| anyhow!(e))?;
        eval_section.add_plot(importance_plot);
        report.add_section(eval_section);
    }

    /* Section 3: Configuration */
    {
        let mut config_section = ReportSection::new("Configuration");
        config_section.add_content(html! {
            style {
                ".code-container {
                    background-color: #f5f5f5;
                    padding: 10px;
                    border-radius: 5px;
                    overflow-x: auto;
                    font-family: monospace;
                    white-space: pre-wrap;
                }"
            }
            div class="code-container" {
                pre {
                    code { (serde_json::to_string_pretty(config)?) }
                }
            }
        });
        report.add_section(config_section);
    }

    report.save_to_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrot_classifiers::config::ForestConfig;
    use chrot_classifiers::data_handling::{default_feature_names, LABEL_COLUMN};
    use chrot_classifiers::math::Array2;
    use chrot_classifiers::models::classifier_trait::ClassifierModel;
    use chrot_classifiers::models::random_forest::RandomForest;

    #[test]
    fn markup_in_config_paths_is_escaped() {
        let x = Array2::from_rows(vec![
            vec![500.0, 2000.0, 20.0, 40.0],
            vec![900.0, 4000.0, 90.0, 150.0],
            vec![3500.0, 2500.0, 80.0, 12.0],
            vec![600.0, 2600.0, 85.0, 30.0],
        ])
        .unwrap();
        let y = [1, 0, 1, 0];
        let mut forest = RandomForest::new(ForestConfig::new(3, Some(2)));
        forest.fit(&x, &y).unwrap();
        let artifact = ModelArtifact::new(forest, default_feature_names(), LABEL_COLUMN, Some(1.0));
        let confusion = ConfusionMatrix::new(&y, &y, 2);
        let counts: BTreeMap<usize, usize> = [(0, 2), (1, 2)].into_iter().collect();

        let config = TrainConfig {
            train_data: String::from("runs/<round&1>.csv"),
            ..TrainConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        write_training_report(&config, &artifact, &counts, &confusion, path.to_str().unwrap())
            .unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("runs/&lt;round&amp;1&gt;.csv"));
        assert!(!html.contains("<round&1>"));
    }
}
