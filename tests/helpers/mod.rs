//! Shared test fixtures: an in-memory database with the pipeline schema and
//! seed helpers for the three read tables.

#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use top_stocks::database::init_schema;

/// In-memory SQLite. A single connection is required: every pooled
/// connection to `sqlite::memory:` would otherwise get its own database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&pool).await.expect("schema init");
    pool
}

/// Insert an undervalued stock whose label works out to `gap / 100`:
/// price 100, intrinsic value 100 * (1 + gap/100).
pub async fn seed_stock(pool: &SqlitePool, symbol: &str, gap: f64, market_cap: f64) {
    let current_price = 100.0;
    let intrinsic_value = current_price * (1.0 + gap / 100.0);
    sqlx::query(
        r#"
        INSERT INTO stocks
            (symbol, company_name, sector, market_cap, current_price,
             intrinsic_value, fair_value, valuation_gap, valuation)
        VALUES (?, ?, 'Technology', ?, ?, ?, ?, ?, 'undervalued')
        "#,
    )
    .bind(symbol)
    .bind(format!("{} Inc", symbol))
    .bind(market_cap)
    .bind(current_price)
    .bind(intrinsic_value)
    .bind(intrinsic_value)
    .bind(gap)
    .execute(pool)
    .await
    .expect("insert stock");
}

/// Insert one article with a sentiment score; returns the article id.
pub async fn seed_scored_article(pool: &SqlitePool, ticker: &str, compound: f64) -> i64 {
    let result = sqlx::query(
        r#"
        INSERT INTO news (ticker, datetime, headline, source, url)
        VALUES (?, ?, ?, 'wire', 'https://example.com/a')
        "#,
    )
    .bind(ticker)
    .bind(1_700_000_000_i64 + (compound * 1e6) as i64)
    .bind(format!("{} headline {}", ticker, compound))
    .execute(pool)
    .await
    .expect("insert article");
    let article_id = result.last_insert_rowid();

    sqlx::query(
        r#"
        INSERT INTO sentiments (article_id, score_neg, score_neu, score_pos, score_compound)
        VALUES (?, 0.1, 0.6, 0.3, ?)
        "#,
    )
    .bind(article_id)
    .bind(compound)
    .execute(pool)
    .await
    .expect("insert sentiment");

    article_id
}
