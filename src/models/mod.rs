use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Candidate stock with valuation fields.
///
/// Rows are created and refreshed by the valuation job; the ranking workflow
/// only reads them. Most numeric columns are nullable because listings enter
/// the table before fundamentals arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub current_eps: Option<f64>,
    pub projected_eps: Option<f64>,
    pub pe_ratio_forward: Option<f64>,
    pub pe_ratio_trailing: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub intrinsic_value: Option<f64>,
    pub fair_value: Option<f64>,
    pub valuation_gap: Option<f64>,
    pub valuation: Option<ValuationLabel>,
}

/// Valuation label assigned by the valuation engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValuationLabel {
    #[serde(rename = "overvalued")]
    Overvalued,
    #[serde(rename = "undervalued")]
    Undervalued,
}

impl ValuationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationLabel::Overvalued => "overvalued",
            ValuationLabel::Undervalued => "undervalued",
        }
    }
}

impl std::str::FromStr for ValuationLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overvalued" => Ok(ValuationLabel::Overvalued),
            "undervalued" => Ok(ValuationLabel::Undervalued),
            other => Err(format!("unknown valuation label: {}", other)),
        }
    }
}

impl std::fmt::Display for ValuationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// News article fetched by the ingestion job.
///
/// Unique per (ticker, datetime, headline, source).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub ticker: String,
    pub category: Option<String>,
    /// Publication time as a unix timestamp.
    pub datetime: i64,
    pub headline: String,
    pub source: String,
    pub summary: Option<String>,
    pub url: String,
}

/// Per-article sentiment score written by the scoring job. One row per
/// article (`article_id` is unique).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentScore {
    pub id: i64,
    pub article_id: i64,
    pub url: Option<String>,
    pub score_neg: f64,
    pub score_neu: f64,
    pub score_pos: f64,
    pub score_compound: f64,
    pub overall_sentiment: Option<String>,
}

/// Three-way sentiment label derived from the compound score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SentimentLabel {
    #[serde(rename = "positive")]
    Positive,
    #[serde(rename = "negative")]
    Negative,
    #[serde(rename = "neutral")]
    Neutral,
}

impl SentimentLabel {
    /// Compound >= 0.05 is positive, <= -0.05 is negative, anything in
    /// between is neutral.
    pub fn from_compound(compound: f64) -> Self {
        if compound >= 0.05 {
            SentimentLabel::Positive
        } else if compound <= -0.05 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// Number of model features.
pub const FEATURE_COUNT: usize = 3;

/// Feature names, in matrix column order. Training and inference both go
/// through this ordering.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["valuation_gap", "avg_compound_sentiment", "market_cap"];

/// One live (inference-time) feature row.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub features: [f64; FEATURE_COUNT],
}

/// One training row: features plus the forward-return label.
#[derive(Debug, Clone)]
pub struct LabeledRow {
    pub symbol: String,
    pub features: [f64; FEATURE_COUNT],
    pub future_return: f64,
}

/// A ranked pick returned by the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPick {
    pub symbol: String,
    pub predicted_return: f64,
    pub current_price: Option<f64>,
}

/// Paper trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeType {
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "sell")]
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "buy",
            TradeType::Sell => "sell",
        }
    }
}

/// Simulated trade recorded by the paper-trading module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperTrade {
    pub id: Option<i64>,
    pub stock_symbol: String,
    pub trade_type: TradeType,
    pub quantity: i64,
    pub price: f64,
    pub trade_date: NaiveDateTime,
    pub trade_status: String,
}

/// Open-position snapshot with mark-to-market gain/loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionReport {
    pub stock_symbol: String,
    pub quantity: i64,
    pub entry_price: f64,
    pub current_price: f64,
    pub gain_loss: f64,
}

/// Weekly portfolio archive row written when open trades are closed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub portfolio_id: Option<i64>,
    pub stock_symbol: String,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub total_quantity: i64,
    pub total_cost: f64,
    pub weekly_profit_loss: f64,
    pub created_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_label_thresholds() {
        assert_eq!(SentimentLabel::from_compound(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_compound(0.049), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(-0.049), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn valuation_label_round_trip() {
        assert_eq!(
            "undervalued".parse::<ValuationLabel>().unwrap(),
            ValuationLabel::Undervalued
        );
        assert_eq!(ValuationLabel::Overvalued.as_str(), "overvalued");
        assert!("cheap".parse::<ValuationLabel>().is_err());
    }
}
