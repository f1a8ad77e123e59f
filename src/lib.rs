// Top-stock ranking pipeline: valuation screening, news sentiment
// aggregation, and a seeded regression forest ranking the weekly picks.

pub mod analysis;
pub mod config;
pub mod database;
pub mod error;
pub mod gate;
pub mod ml;
pub mod models;
pub mod trading;
pub mod valuation;

// Re-export commonly used items
pub use analysis::{rank_top_stocks, top_n, RankingParams};
pub use config::RankingConfig;
pub use error::{PipelineError, Result};
pub use gate::WorkflowGate;
pub use models::{Stock, TopPick, ValuationLabel};
