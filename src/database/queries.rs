use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::Result;
use crate::models::{NewsArticle, SentimentScore, Stock, ValuationLabel};

fn stock_from_row(row: &SqliteRow) -> Stock {
    Stock {
        symbol: row.get("symbol"),
        company_name: row.try_get("company_name").ok(),
        sector: row.try_get("sector").ok(),
        market_cap: row.try_get("market_cap").ok(),
        current_price: row.try_get("current_price").ok(),
        current_eps: row.try_get("current_eps").ok(),
        projected_eps: row.try_get("projected_eps").ok(),
        pe_ratio_forward: row.try_get("pe_ratio_forward").ok(),
        pe_ratio_trailing: row.try_get("pe_ratio_trailing").ok(),
        earnings_growth: row.try_get("earnings_growth").ok(),
        dividend_yield: row.try_get("dividend_yield").ok(),
        beta: row.try_get("beta").ok(),
        intrinsic_value: row.try_get("intrinsic_value").ok(),
        fair_value: row.try_get("fair_value").ok(),
        valuation_gap: row.try_get("valuation_gap").ok(),
        valuation: row
            .try_get::<String, _>("valuation")
            .ok()
            .and_then(|s| s.parse().ok()),
    }
}

/// Load all stocks carrying the given valuation label.
///
/// No pagination: the universe is small enough to hold in memory. An
/// unreachable store propagates as an error with no retry.
pub async fn load_universe(pool: &SqlitePool, valuation: ValuationLabel) -> Result<Vec<Stock>> {
    let rows = sqlx::query("SELECT * FROM stocks WHERE valuation = ?")
        .bind(valuation.as_str())
        .fetch_all(pool)
        .await?;

    let stocks: Vec<Stock> = rows.iter().map(stock_from_row).collect();

    debug!(count = stocks.len(), valuation = %valuation, "loaded stock universe");
    Ok(stocks)
}

/// Load the whole stocks table, valued or not. Used by the valuation engine.
pub async fn load_all_stocks(pool: &SqlitePool) -> Result<Vec<Stock>> {
    let rows = sqlx::query("SELECT * FROM stocks").fetch_all(pool).await?;
    Ok(rows.iter().map(stock_from_row).collect())
}

/// Load the full news table.
pub async fn load_articles(pool: &SqlitePool) -> Result<Vec<NewsArticle>> {
    let rows = sqlx::query(
        "SELECT id, ticker, category, datetime, headline, source, summary, url FROM news",
    )
    .fetch_all(pool)
    .await?;

    let articles: Vec<NewsArticle> = rows
        .into_iter()
        .map(|row| NewsArticle {
            id: row.get("id"),
            ticker: row.get("ticker"),
            category: row.try_get("category").ok(),
            datetime: row.get("datetime"),
            headline: row.get("headline"),
            source: row.get("source"),
            summary: row.try_get("summary").ok(),
            url: row.get("url"),
        })
        .collect();

    debug!(count = articles.len(), "loaded news articles");
    Ok(articles)
}

/// Load the full sentiment-score table.
pub async fn load_sentiment_scores(pool: &SqlitePool) -> Result<Vec<SentimentScore>> {
    let rows = sqlx::query("SELECT * FROM sentiments").fetch_all(pool).await?;

    let scores: Vec<SentimentScore> = rows
        .into_iter()
        .map(|row| SentimentScore {
            id: row.get("id"),
            article_id: row.get("article_id"),
            url: row.try_get("url").ok(),
            score_neg: row.try_get("score_neg").unwrap_or(0.0),
            score_neu: row.try_get("score_neu").unwrap_or(0.0),
            score_pos: row.try_get("score_pos").unwrap_or(0.0),
            score_compound: row.try_get("score_compound").unwrap_or(0.0),
            overall_sentiment: row.try_get("overall_sentiment").ok(),
        })
        .collect();

    debug!(count = scores.len(), "loaded sentiment scores");
    Ok(scores)
}

/// Current price per symbol, for marking paper trades to market.
///
/// The pipeline performs no network I/O; the stocks table is the price
/// source of record at ranking time.
pub async fn load_current_prices(pool: &SqlitePool) -> Result<HashMap<String, f64>> {
    let rows = sqlx::query(
        "SELECT symbol, current_price FROM stocks WHERE current_price IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.get("symbol"), row.get("current_price")))
        .collect())
}
