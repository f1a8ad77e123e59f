pub mod queries;
pub mod schema;

pub use queries::*;
pub use schema::*;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::Result;

/// Open a connection pool to the SQLite store.
///
/// The workflow only reads, so the pool is kept small; `mode=rwc` lets the
/// paper-trading and valuation jobs create the file on first run.
pub async fn connect(db_path: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;
    info!(db_path, "database connection established");
    Ok(pool)
}
