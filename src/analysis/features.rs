use std::collections::HashMap;

use crate::models::{FeatureRow, LabeledRow, Stock, FEATURE_COUNT};

/// Extract the model features for one stock, or `None` if a required
/// feature is missing.
///
/// This is the single code path shared by training and inference; the model's
/// coefficients are meaningless against live data unless both sides assemble
/// features identically. Missing sentiment defaults to exactly 0.0 (neutral);
/// missing valuation_gap or market_cap is never imputed.
fn extract_features(
    stock: &Stock,
    sentiment: &HashMap<String, f64>,
) -> Option<[f64; FEATURE_COUNT]> {
    let valuation_gap = stock.valuation_gap?;
    let market_cap = stock.market_cap?;
    let avg_compound = sentiment.get(&stock.symbol).copied().unwrap_or(0.0);
    Some([valuation_gap, avg_compound, market_cap])
}

/// Assemble live (inference-time) feature rows.
///
/// Left join of stocks to aggregated sentiment; stocks missing a required
/// feature are excluded from ranking. Output row count <= input row count.
pub fn assemble_features(stocks: &[Stock], sentiment: &HashMap<String, f64>) -> Vec<FeatureRow> {
    stocks
        .iter()
        .filter_map(|stock| {
            let features = extract_features(stock, sentiment)?;
            Some(FeatureRow {
                symbol: stock.symbol.clone(),
                current_price: stock.current_price,
                features,
            })
        })
        .collect()
}

/// Assemble training rows with the forward-return label:
/// `future_return = (intrinsic_value - current_price) / current_price`.
///
/// Rows missing a feature or without a usable label (no intrinsic value, or
/// a non-positive price) are dropped.
pub fn assemble_training_rows(
    stocks: &[Stock],
    sentiment: &HashMap<String, f64>,
) -> Vec<LabeledRow> {
    stocks
        .iter()
        .filter_map(|stock| {
            let features = extract_features(stock, sentiment)?;
            let intrinsic_value = stock.intrinsic_value?;
            let current_price = stock.current_price.filter(|p| *p > 0.0)?;
            Some(LabeledRow {
                symbol: stock.symbol.clone(),
                features,
                future_return: (intrinsic_value - current_price) / current_price,
            })
        })
        .collect()
}
