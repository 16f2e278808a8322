pub mod classifier_trait;
pub mod decision_tree;
pub mod random_forest;
pub mod utils;
