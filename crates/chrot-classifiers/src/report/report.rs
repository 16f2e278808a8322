use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// A titled block of HTML content and plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, markup: Markup) {
        self.content.push(markup);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let div_id = format!(
            "plot-{}-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.content.len()
        );
        self.content
            .push(PreEscaped(plot.to_inline_html(Some(div_id.as_str()))));
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div class="block" { (block) }
                }
            }
        }
    }
}

/// Standalone HTML page made of sections.
pub struct Report {
    software: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software: &str, version: &str, title: &str) -> Self {
        Self {
            software: software.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                         table { border-collapse: collapse; }
                         td, th { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
                         .block { margin-bottom: 1.5em; }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p { (self.software) " " (self.version) " - generated " (generated) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }
}
