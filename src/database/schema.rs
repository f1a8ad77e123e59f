use sqlx::SqlitePool;

use crate::error::Result;

/// Create all tables if they do not exist yet.
///
/// Production databases are populated by the external ingestion jobs; this
/// exists for fresh deployments and for the test suites, and is safe to call
/// repeatedly.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stocks (
            symbol TEXT PRIMARY KEY,
            company_name TEXT,
            sector TEXT,
            market_cap REAL,
            current_price REAL,
            current_eps REAL,
            projected_eps REAL,
            pe_ratio_forward REAL,
            pe_ratio_trailing REAL,
            earnings_growth REAL,
            dividend_yield REAL,
            beta REAL,
            intrinsic_value REAL,
            fair_value REAL,
            valuation_gap REAL,
            valuation TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS news (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticker TEXT NOT NULL,
            category TEXT,
            datetime INTEGER NOT NULL,
            headline TEXT NOT NULL,
            image TEXT,
            related TEXT,
            source TEXT NOT NULL,
            summary TEXT,
            url TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (ticker) REFERENCES stocks(symbol),
            UNIQUE (ticker, datetime, headline, source)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sentiments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            article_id INTEGER,
            url TEXT,
            score_neg REAL,
            score_neu REAL,
            score_pos REAL,
            score_compound REAL,
            overall_sentiment TEXT,
            FOREIGN KEY (article_id) REFERENCES news(id),
            UNIQUE (article_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS paper_trades (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stock_symbol TEXT NOT NULL,
            trade_type TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            price REAL NOT NULL,
            trade_date TEXT NOT NULL,
            trade_status TEXT NOT NULL DEFAULT 'open'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio (
            portfolio_id INTEGER PRIMARY KEY AUTOINCREMENT,
            stock_symbol TEXT NOT NULL,
            week_start_date TEXT NOT NULL,
            week_end_date TEXT NOT NULL,
            total_quantity INTEGER NOT NULL,
            total_cost REAL NOT NULL,
            weekly_profit_loss REAL NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
