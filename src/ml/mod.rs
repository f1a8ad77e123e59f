pub mod decision_tree;
pub mod metrics;
pub mod random_forest;

pub use metrics::{r2_score, train_test_split};
pub use random_forest::{FittedForest, RandomForestRegressor};
