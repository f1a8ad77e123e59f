use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::analysis::features::{assemble_features, assemble_training_rows};
use crate::analysis::sentiment::aggregate_by_ticker;
use crate::database::{load_articles, load_sentiment_scores, load_universe};
use crate::error::{PipelineError, Result};
use crate::ml::{r2_score, train_test_split, RandomForestRegressor};
use crate::models::{TopPick, ValuationLabel, FEATURE_NAMES};

/// Fraction of training rows held out for the informational R² check.
const TEST_FRACTION: f64 = 0.2;

/// Caller-supplied workflow parameters. The storage location arrives as the
/// pool itself; nothing is read from the environment here.
#[derive(Debug, Clone)]
pub struct RankingParams {
    pub top_n: usize,
    pub valuation: ValuationLabel,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            top_n: 5,
            valuation: ValuationLabel::Undervalued,
        }
    }
}

/// Run the full ranking workflow: load the universe, aggregate sentiment,
/// assemble features, retrain the forest from scratch, and return the top-N
/// picks by predicted forward return.
///
/// Single-threaded and stateless; every invocation retrains on whatever the
/// store currently holds. With identical tables the fixed seed makes two
/// consecutive runs produce identical output. Requesting more picks than
/// there are qualifying stocks returns all of them.
pub async fn rank_top_stocks(pool: &SqlitePool, params: &RankingParams) -> Result<Vec<TopPick>> {
    let stocks = load_universe(pool, params.valuation).await?;
    if stocks.is_empty() {
        return Err(PipelineError::EmptyUniverse {
            valuation: params.valuation.to_string(),
        });
    }
    info!(stocks = stocks.len(), valuation = %params.valuation, "loaded stock universe");

    let articles = load_articles(pool).await?;
    let scores = load_sentiment_scores(pool).await?;
    let sentiment = aggregate_by_ticker(&articles, &scores);
    info!(
        articles = articles.len(),
        tickers_with_sentiment = sentiment.len(),
        "aggregated news sentiment"
    );

    let training = assemble_training_rows(&stocks, &sentiment);
    if training.len() < 2 {
        return Err(PipelineError::InsufficientTrainingData {
            rows: training.len(),
        });
    }

    let x: Vec<Vec<f64>> = training.iter().map(|r| r.features.to_vec()).collect();
    let y: Vec<f64> = training.iter().map(|r| r.future_return).collect();

    let forest = RandomForestRegressor::default();
    let (x_train, y_train, x_test, y_test) = train_test_split(&x, &y, TEST_FRACTION, forest.seed);

    // The held-out R² never gates serving; with too few rows to hold any
    // out, fall back to training on everything.
    let model = if x_train.len() >= 2 {
        let model = forest.fit(&x_train, &y_train)?;
        if !x_test.is_empty() {
            let r2 = r2_score(&y_test, &model.predict(&x_test)?);
            info!(
                r2 = format!("{:.4}", r2),
                train_rows = x_train.len(),
                test_rows = x_test.len(),
                "model evaluation"
            );
        }
        model
    } else {
        warn!(
            rows = training.len(),
            "too few rows to hold out a test set, training on all rows"
        );
        forest.fit(&x, &y)?
    };

    for (name, importance) in FEATURE_NAMES.iter().zip(model.feature_importances()) {
        info!(feature = name, importance = format!("{:.4}", importance), "feature importance");
    }

    let live = assemble_features(&stocks, &sentiment);
    let mut scored = Vec::with_capacity(live.len());
    for row in &live {
        scored.push(TopPick {
            symbol: row.symbol.clone(),
            predicted_return: model.predict_row(&row.features)?,
            current_price: row.current_price,
        });
    }

    Ok(top_n(scored, params.top_n))
}

/// Take the `n` highest-scoring picks, descending by predicted return.
///
/// The sort is stable, so ties keep their input order; `n` larger than the
/// candidate list returns everything.
pub fn top_n(mut scored: Vec<TopPick>, n: usize) -> Vec<TopPick> {
    scored.sort_by(|a, b| {
        b.predicted_return
            .partial_cmp(&a.predicted_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(symbol: &str, predicted: f64) -> TopPick {
        TopPick {
            symbol: symbol.to_string(),
            predicted_return: predicted,
            current_price: Some(100.0),
        }
    }

    #[test]
    fn orders_descending_and_truncates() {
        let scored = vec![pick("A", 0.1), pick("B", 0.5), pick("C", 0.3)];
        let top = top_n(scored, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].symbol, "B");
        assert_eq!(top[1].symbol, "C");
    }

    #[test]
    fn ties_keep_input_order() {
        let scored = vec![pick("FIRST", 0.2), pick("SECOND", 0.2), pick("THIRD", 0.2)];
        let top = top_n(scored, 3);
        assert_eq!(top[0].symbol, "FIRST");
        assert_eq!(top[1].symbol, "SECOND");
        assert_eq!(top[2].symbol, "THIRD");
    }

    #[test]
    fn n_larger_than_candidates_returns_all() {
        let scored = vec![pick("A", 0.1), pick("B", 0.2)];
        let top = top_n(scored, 50);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].symbol, "B");
    }
}
