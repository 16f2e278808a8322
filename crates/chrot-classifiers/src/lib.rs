//! chrot-classifiers: cluster-head rotation modelling for wireless sensor networks.
//!
//! This crate provides a CART decision tree and a random forest classifier,
//! the feature/label contract for cluster-head rotation data, rule-based label
//! synthesis, an order-preserving CSV table, model persistence, metrics and
//! HTML training reports.
//!
//! The command line front-end lives in the `chrot-cli` crate.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod labeling;
pub mod math;
pub mod models;
pub mod report;
pub mod stats;
