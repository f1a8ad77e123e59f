use anyhow::{Context, Result};

use crate::models::ValuationLabel;

/// Environment-backed configuration for the CLI. Library functions take
/// their parameters explicitly; only the binary reads the environment.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub db_path: String,
    pub top_n: usize,
    pub valuation: ValuationLabel,
}

impl RankingConfig {
    /// Read `DB_PATH` (required), `TOP_N_STOCKS` (default 5) and `VALUATION`
    /// (default undervalued) from the environment, loading `.env` first if
    /// present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let db_path = std::env::var("DB_PATH")
            .context("DB_PATH is not set; point it at the SQLite stock database")?;

        let top_n = match std::env::var("TOP_N_STOCKS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("TOP_N_STOCKS is not a number: {}", raw))?,
            Err(_) => 5,
        };

        let valuation = match std::env::var("VALUATION") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("VALUATION must be 'overvalued' or 'undervalued'")?,
            Err(_) => ValuationLabel::Undervalued,
        };

        Ok(Self {
            db_path,
            top_n,
            valuation,
        })
    }
}
