//! HTML training reports.
//!
//! `report` assembles sections into a standalone page with maud; `plots`
//! turns model outputs into `plotly::Plot`s embedded in those sections.
pub mod plots;
pub mod report;

pub use report::{Report, ReportSection};
