//! Heuristic intrinsic-value engine.
//!
//! The formulas, defaults, and cleaning filters reproduce the production
//! valuation job exactly, including the `(1 - discount_rate)` multiplier on
//! intrinsic value. They are domain logic, taken as given.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::database::load_all_stocks;
use crate::error::Result;
use crate::models::{Stock, ValuationLabel};

/// CAPM-style inputs for the discount rate.
#[derive(Debug, Clone)]
pub struct ValuationParams {
    /// U.S. 10-year Treasury yield stand-in.
    pub risk_free_rate: f64,
    /// Long-run S&P 500 return stand-in.
    pub market_return: f64,
}

impl Default for ValuationParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.03,
            market_return: 0.08,
        }
    }
}

/// Valuation columns produced for one stock.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedValuation {
    pub intrinsic_value: f64,
    pub fair_value: f64,
    pub valuation_gap: f64,
    pub valuation: ValuationLabel,
}

/// Compute the valuation columns for one stock, or `None` when any required
/// input (projected EPS, forward P/E, price, earnings growth) is missing or
/// zero. Beta defaults to 1.0.
pub fn compute_valuation(stock: &Stock, params: &ValuationParams) -> Option<ComputedValuation> {
    let projected_eps = stock.projected_eps.filter(|v| *v != 0.0)?;
    let forward_pe = stock.pe_ratio_forward.filter(|v| *v != 0.0)?;
    let current_price = stock.current_price.filter(|v| *v != 0.0)?;
    let earnings_growth = stock.earnings_growth.filter(|v| *v != 0.0)?;
    let beta = stock.beta.unwrap_or(1.0);

    let discount_rate =
        params.risk_free_rate + beta * (params.market_return - params.risk_free_rate);
    let intrinsic_value =
        projected_eps * forward_pe * (1.0 + earnings_growth) * (1.0 - discount_rate);
    let fair_value = projected_eps * (1.0 + earnings_growth) * forward_pe;
    let valuation_gap = ((current_price - intrinsic_value) / intrinsic_value) * 100.0;

    Some(ComputedValuation {
        intrinsic_value,
        fair_value,
        valuation_gap,
        valuation: if valuation_gap > 0.0 {
            ValuationLabel::Overvalued
        } else {
            ValuationLabel::Undervalued
        },
    })
}

struct Candidate {
    symbol: String,
    projected_eps: f64,
    forward_pe: f64,
    earnings_growth: f64,
    current_price: f64,
    valuation: ComputedValuation,
}

/// Population z-scores (ddof = 0). A zero-variance input maps to all zeros.
fn zscores(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Apply the cleaning filters in the original order: positive projected EPS
/// and forward P/E, non-negative growth, |z| < 2 on intrinsic/price, the
/// ratio itself below 3, and strictly positive price/intrinsic/fair values.
fn clean_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.retain(|c| c.projected_eps > 0.0);
    candidates.retain(|c| c.forward_pe > 0.0);
    candidates.retain(|c| c.earnings_growth >= 0.0);

    let ratios: Vec<f64> = candidates
        .iter()
        .map(|c| c.valuation.intrinsic_value / c.current_price)
        .collect();
    let z = zscores(&ratios);
    let mut keep = z.iter().map(|z| z.abs() < 2.0).collect::<Vec<_>>().into_iter();
    candidates.retain(|_| keep.next().unwrap_or(false));

    candidates.retain(|c| c.valuation.intrinsic_value / c.current_price < 3.0);
    candidates.retain(|c| {
        c.current_price > 0.0 && c.valuation.intrinsic_value > 0.0 && c.valuation.fair_value > 0.0
    });
    candidates
}

/// Recompute valuations across the whole stocks table, persist the survivors
/// and drop everything that failed cleaning, mirroring the nightly valuation
/// job. Returns the surviving row count.
pub async fn revalue_universe(pool: &SqlitePool, params: &ValuationParams) -> Result<usize> {
    let stocks = load_all_stocks(pool).await?;
    info!(stocks = stocks.len(), "revaluing stock universe");

    let candidates: Vec<Candidate> = stocks
        .iter()
        .filter_map(|stock| {
            let valuation = compute_valuation(stock, params)?;
            Some(Candidate {
                symbol: stock.symbol.clone(),
                projected_eps: stock.projected_eps?,
                forward_pe: stock.pe_ratio_forward?,
                earnings_growth: stock.earnings_growth?,
                current_price: stock.current_price?,
                valuation,
            })
        })
        .collect();

    let survivors = clean_candidates(candidates);
    if survivors.is_empty() {
        warn!("no stocks survived valuation cleaning, leaving the table untouched");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for candidate in &survivors {
        sqlx::query(
            r#"
            UPDATE stocks
            SET intrinsic_value = ?, fair_value = ?, valuation_gap = ?, valuation = ?
            WHERE symbol = ?
            "#,
        )
        .bind(candidate.valuation.intrinsic_value)
        .bind(candidate.valuation.fair_value)
        .bind(candidate.valuation.valuation_gap)
        .bind(candidate.valuation.valuation.as_str())
        .bind(&candidate.symbol)
        .execute(&mut *tx)
        .await?;
    }

    let placeholders = vec!["?"; survivors.len()].join(", ");
    let delete = format!("DELETE FROM stocks WHERE symbol NOT IN ({})", placeholders);
    let mut query = sqlx::query(&delete);
    for candidate in &survivors {
        query = query.bind(&candidate.symbol);
    }
    query.execute(&mut *tx).await?;
    tx.commit().await?;

    info!(survivors = survivors.len(), "valuation refresh complete");
    Ok(survivors.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_with_fundamentals(symbol: &str) -> Stock {
        Stock {
            symbol: symbol.to_string(),
            company_name: None,
            sector: None,
            market_cap: Some(5e9),
            current_price: Some(100.0),
            current_eps: Some(4.0),
            projected_eps: Some(5.0),
            pe_ratio_forward: Some(20.0),
            pe_ratio_trailing: Some(25.0),
            earnings_growth: Some(0.10),
            dividend_yield: Some(0.01),
            beta: Some(1.2),
            intrinsic_value: None,
            fair_value: None,
            valuation_gap: None,
            valuation: None,
        }
    }

    #[test]
    fn formula_matches_the_reference_numbers() {
        let stock = stock_with_fundamentals("AAPL");
        let v = compute_valuation(&stock, &ValuationParams::default()).unwrap();

        // discount = 0.03 + 1.2 * 0.05 = 0.09
        // intrinsic = 5 * 20 * 1.1 * 0.91 = 100.1
        // fair = 5 * 1.1 * 20 = 110
        // gap = (100 - 100.1) / 100.1 * 100
        assert!((v.intrinsic_value - 100.1).abs() < 1e-9);
        assert!((v.fair_value - 110.0).abs() < 1e-9);
        assert!((v.valuation_gap - ((100.0 - 100.1) / 100.1 * 100.0)).abs() < 1e-9);
        assert_eq!(v.valuation, ValuationLabel::Undervalued);
    }

    #[test]
    fn positive_gap_is_overvalued() {
        let mut stock = stock_with_fundamentals("HOT");
        stock.current_price = Some(150.0);
        let v = compute_valuation(&stock, &ValuationParams::default()).unwrap();
        assert!(v.valuation_gap > 0.0);
        assert_eq!(v.valuation, ValuationLabel::Overvalued);
    }

    #[test]
    fn missing_beta_defaults_to_one() {
        let mut stock = stock_with_fundamentals("NOB");
        stock.beta = None;
        let v = compute_valuation(&stock, &ValuationParams::default()).unwrap();
        // discount = 0.03 + 1.0 * 0.05 = 0.08 -> intrinsic = 110 * 0.92
        assert!((v.intrinsic_value - 101.2).abs() < 1e-9);
    }

    #[test]
    fn zero_inputs_yield_no_valuation() {
        let mut stock = stock_with_fundamentals("ZERO");
        stock.earnings_growth = Some(0.0);
        assert!(compute_valuation(&stock, &ValuationParams::default()).is_none());

        let mut stock = stock_with_fundamentals("NOEPS");
        stock.projected_eps = None;
        assert!(compute_valuation(&stock, &ValuationParams::default()).is_none());
    }

    #[test]
    fn zscores_handle_constant_input() {
        assert_eq!(zscores(&[2.0, 2.0, 2.0]), vec![0.0, 0.0, 0.0]);
        let z = zscores(&[1.0, 2.0, 3.0]);
        assert!(z[0] < 0.0 && z[1].abs() < 1e-12 && z[2] > 0.0);
    }

    #[test]
    fn cleaning_drops_extreme_intrinsic_ratios() {
        // Nine sane candidates and one with an absurd intrinsic/price ratio.
        let mut candidates: Vec<Candidate> = (0..9)
            .map(|i| Candidate {
                symbol: format!("OK{}", i),
                projected_eps: 5.0,
                forward_pe: 20.0,
                earnings_growth: 0.1,
                current_price: 100.0,
                valuation: ComputedValuation {
                    intrinsic_value: 100.0 + i as f64,
                    fair_value: 110.0,
                    valuation_gap: -1.0,
                    valuation: ValuationLabel::Undervalued,
                },
            })
            .collect();
        candidates.push(Candidate {
            symbol: "WILD".to_string(),
            projected_eps: 5.0,
            forward_pe: 20.0,
            earnings_growth: 0.1,
            current_price: 100.0,
            valuation: ComputedValuation {
                intrinsic_value: 290.0,
                fair_value: 300.0,
                valuation_gap: -65.0,
                valuation: ValuationLabel::Undervalued,
            },
        });

        let survivors = clean_candidates(candidates);
        assert!(survivors.iter().all(|c| c.symbol != "WILD"));
        assert_eq!(survivors.len(), 9);
    }

    #[test]
    fn cleaning_drops_negative_growth() {
        let candidates = vec![Candidate {
            symbol: "SHRINK".to_string(),
            projected_eps: 5.0,
            forward_pe: 20.0,
            earnings_growth: -0.2,
            current_price: 100.0,
            valuation: ComputedValuation {
                intrinsic_value: 90.0,
                fair_value: 95.0,
                valuation_gap: 11.0,
                valuation: ValuationLabel::Overvalued,
            },
        }];
        assert!(clean_candidates(candidates).is_empty());
    }
}
