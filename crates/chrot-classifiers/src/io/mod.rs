//! Readers and writers for tabular data and fitted models.
pub mod csv_table;
pub mod model_store;

pub use csv_table::CsvTable;
pub use model_store::{load_model, save_model, ModelArtifact, MODEL_FORMAT_VERSION};
