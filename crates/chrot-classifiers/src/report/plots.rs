use std::collections::BTreeMap;

use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};

/// Bar chart of per-feature importances.
pub fn plot_feature_importances(feature_names: &[String], importances: &[f64]) -> Result<Plot, String> {
    if feature_names.len() != importances.len() {
        return Err(format!(
            "{} feature names but {} importances",
            feature_names.len(),
            importances.len()
        ));
    }

    let trace = Bar::new(feature_names.to_vec(), importances.to_vec()).name("Importance");
    let layout = Layout::new()
        .title("Feature Importances (mean impurity decrease)")
        .x_axis(Axis::new().title("Feature"))
        .y_axis(Axis::new().title("Importance"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    Ok(plot)
}

/// Bar chart of label counts.
pub fn plot_label_distribution(counts: &BTreeMap<usize, usize>, title: &str) -> Plot {
    let labels: Vec<String> = counts.keys().map(|k| k.to_string()).collect();
    let values: Vec<usize> = counts.values().copied().collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(labels, values).name("Rows"));
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Label"))
            .y_axis(Axis::new().title("Count")),
    );
    plot
}
