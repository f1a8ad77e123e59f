use std::collections::HashMap;

use crate::models::{NewsArticle, SentimentScore};

/// Mean compound sentiment per ticker.
///
/// Inner-joins scores to articles on article identity and averages
/// `score_compound` within each ticker. Tickers with no scored articles do
/// not appear in the output; the feature assembler fills those with 0.0.
pub fn aggregate_by_ticker(
    articles: &[NewsArticle],
    scores: &[SentimentScore],
) -> HashMap<String, f64> {
    let ticker_by_article: HashMap<i64, &str> = articles
        .iter()
        .map(|a| (a.id, a.ticker.as_str()))
        .collect();

    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for score in scores {
        // Inner join: scores without a matching article are dropped.
        let Some(ticker) = ticker_by_article.get(&score.article_id) else {
            continue;
        };
        let entry = sums.entry((*ticker).to_string()).or_insert((0.0, 0));
        entry.0 += score.score_compound;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(ticker, (sum, count))| (ticker, sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, ticker: &str) -> NewsArticle {
        NewsArticle {
            id,
            ticker: ticker.to_string(),
            category: None,
            datetime: 1_700_000_000 + id,
            headline: format!("headline {}", id),
            source: "wire".to_string(),
            summary: None,
            url: format!("https://example.com/{}", id),
        }
    }

    fn score(article_id: i64, compound: f64) -> SentimentScore {
        SentimentScore {
            id: article_id,
            article_id,
            url: None,
            score_neg: 0.0,
            score_neu: 1.0,
            score_pos: 0.0,
            score_compound: compound,
            overall_sentiment: None,
        }
    }

    #[test]
    fn averages_compound_per_ticker() {
        let articles = vec![article(1, "AAPL"), article(2, "AAPL"), article(3, "NVDA")];
        let scores = vec![score(1, 0.4), score(2, 0.2), score(3, -0.1)];

        let agg = aggregate_by_ticker(&articles, &scores);
        assert_eq!(agg.len(), 2);
        assert!((agg["AAPL"] - 0.3).abs() < 1e-12);
        assert!((agg["NVDA"] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn output_is_subset_of_joined_tickers() {
        // PLTR has an article but no score; orphan score 99 has no article.
        let articles = vec![article(1, "AAPL"), article(2, "PLTR")];
        let scores = vec![score(1, 0.5), score(99, 0.9)];

        let agg = aggregate_by_ticker(&articles, &scores);
        assert_eq!(agg.len(), 1);
        assert!(agg.contains_key("AAPL"));
        assert!(!agg.contains_key("PLTR"));
    }

    #[test]
    fn means_stay_in_compound_range() {
        let articles: Vec<_> = (0..10).map(|i| article(i, "AMD")).collect();
        let scores: Vec<_> = (0..10)
            .map(|i| score(i, if i % 2 == 0 { 1.0 } else { -1.0 }))
            .collect();

        let agg = aggregate_by_ticker(&articles, &scores);
        let mean = agg["AMD"];
        assert!((-1.0..=1.0).contains(&mean));
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        let agg = aggregate_by_ticker(&[], &[]);
        assert!(agg.is_empty());
    }
}
