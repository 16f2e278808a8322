pub mod cli;
pub mod rotation;
