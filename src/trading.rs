//! Paper-trading companion: buys the weekly top picks, marks open positions
//! to market, and archives each week's results into the portfolio table.
//!
//! Prices are supplied by the caller (usually straight from the stocks
//! table); this module performs no network I/O.

use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDateTime};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{PortfolioEntry, PositionReport, TopPick, TradeType};

const TRADE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trading week length used when archiving a buy into the portfolio.
const TRADING_WEEK_DAYS: i64 = 5;

/// Record one open buy per pick at its current price. Picks without a price
/// are skipped. Returns the number of trades opened.
pub async fn open_trades_for_picks(
    pool: &SqlitePool,
    picks: &[TopPick],
    quantity: i64,
) -> Result<usize> {
    let trade_date = Local::now().naive_local().format(TRADE_DATE_FORMAT).to_string();
    let mut opened = 0;

    for pick in picks {
        let Some(price) = pick.current_price else {
            warn!(symbol = %pick.symbol, "no current price, skipping paper trade");
            continue;
        };
        sqlx::query(
            r#"
            INSERT INTO paper_trades (stock_symbol, trade_type, quantity, price, trade_date, trade_status)
            VALUES (?, ?, ?, ?, ?, 'open')
            "#,
        )
        .bind(&pick.symbol)
        .bind(TradeType::Buy.as_str())
        .bind(quantity)
        .bind(price)
        .bind(&trade_date)
        .execute(pool)
        .await?;
        opened += 1;
    }

    info!(opened, "paper trades opened");
    Ok(opened)
}

/// Mark all open trades to market. Symbols missing from `prices` are skipped
/// with a warning rather than guessed.
pub async fn open_positions_report(
    pool: &SqlitePool,
    prices: &HashMap<String, f64>,
) -> Result<Vec<PositionReport>> {
    let rows = sqlx::query(
        "SELECT stock_symbol, quantity, price FROM paper_trades WHERE trade_status = 'open'",
    )
    .fetch_all(pool)
    .await?;

    let mut report = Vec::with_capacity(rows.len());
    for row in rows {
        let symbol: String = row.get("stock_symbol");
        let Some(&current_price) = prices.get(&symbol) else {
            warn!(symbol = %symbol, "no price available, omitting from report");
            continue;
        };
        let quantity: i64 = row.get("quantity");
        let entry_price: f64 = row.get("price");
        report.push(PositionReport {
            gain_loss: (current_price - entry_price) * quantity as f64,
            stock_symbol: symbol,
            quantity,
            entry_price,
            current_price,
        });
    }
    Ok(report)
}

/// Close out the week: archive every open trade into the portfolio with its
/// realized profit/loss, then clear the paper-trades blotter. One
/// transaction; either the whole week closes or none of it does.
///
/// Returns the closed positions with their gain/loss.
pub async fn close_all_open_trades(
    pool: &SqlitePool,
    prices: &HashMap<String, f64>,
) -> Result<Vec<PositionReport>> {
    let rows = sqlx::query(
        "SELECT id, stock_symbol, quantity, price, trade_date FROM paper_trades WHERE trade_status = 'open'",
    )
    .fetch_all(pool)
    .await?;

    let mut tx = pool.begin().await?;
    let mut closed = Vec::with_capacity(rows.len());

    for row in rows {
        let symbol: String = row.get("stock_symbol");
        let Some(&current_price) = prices.get(&symbol) else {
            warn!(symbol = %symbol, "no price available, position stays open");
            continue;
        };
        let id: i64 = row.get("id");
        let quantity: i64 = row.get("quantity");
        let entry_price: f64 = row.get("price");
        let trade_date: String = row.get("trade_date");

        let gain_loss = (current_price - entry_price) * quantity as f64;
        let total_cost = entry_price * quantity as f64;

        let opened_at = NaiveDateTime::parse_from_str(&trade_date, TRADE_DATE_FORMAT)
            .unwrap_or_else(|_| Local::now().naive_local());
        let week_start = opened_at.date();
        let week_end = week_start + Duration::days(TRADING_WEEK_DAYS);

        sqlx::query(
            r#"
            INSERT INTO portfolio
                (stock_symbol, week_start_date, week_end_date, total_quantity, total_cost, weekly_profit_loss)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&symbol)
        .bind(week_start.to_string())
        .bind(week_end.to_string())
        .bind(quantity)
        .bind(total_cost)
        .bind(gain_loss)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM paper_trades WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        closed.push(PositionReport {
            stock_symbol: symbol,
            quantity,
            entry_price,
            current_price,
            gain_loss,
        });
    }

    tx.commit().await?;
    info!(closed = closed.len(), "weekly paper positions closed");
    Ok(closed)
}

/// Portfolio rows whose trading week spans the given date (YYYY-MM-DD
/// strings compare correctly in SQL).
pub async fn portfolio_for_week(pool: &SqlitePool, date: chrono::NaiveDate) -> Result<Vec<PortfolioEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT portfolio_id, stock_symbol, week_start_date, week_end_date,
               total_quantity, total_cost, weekly_profit_loss
        FROM portfolio
        WHERE week_start_date <= ? AND week_end_date >= ?
        "#,
    )
    .bind(date.to_string())
    .bind(date.to_string())
    .fetch_all(pool)
    .await?;

    let entries = rows
        .into_iter()
        .filter_map(|row| {
            let week_start: String = row.get("week_start_date");
            let week_end: String = row.get("week_end_date");
            Some(PortfolioEntry {
                portfolio_id: row.try_get("portfolio_id").ok(),
                stock_symbol: row.get("stock_symbol"),
                week_start_date: week_start.parse().ok()?,
                week_end_date: week_end.parse().ok()?,
                total_quantity: row.get("total_quantity"),
                total_cost: row.get("total_cost"),
                weekly_profit_loss: row.get("weekly_profit_loss"),
                created_at: None,
            })
        })
        .collect();

    Ok(entries)
}
