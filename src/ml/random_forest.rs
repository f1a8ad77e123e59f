//! Bagged regression forest with a fixed seed.
//!
//! Chosen for robustness on a small, noisy, heterogeneous feature set:
//! no feature scaling required, and averaging 100 trees smooths the
//! high-variance fits the tiny universe would otherwise produce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PipelineError, Result};
use crate::ml::decision_tree::DecisionTree;

/// Default number of trees in the ensemble.
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Seed used across the pipeline so consecutive runs over identical tables
/// rank identically.
pub const DEFAULT_SEED: u64 = 42;

/// Forest configuration. `fit` consumes nothing; the same config can train
/// any number of models.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub seed: u64,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            seed: DEFAULT_SEED,
        }
    }
}

impl RandomForestRegressor {
    /// Train on the given feature matrix and targets.
    ///
    /// Each tree sees an n-of-n bootstrap sample drawn from a seeded RNG.
    /// Fails fast with `InsufficientTrainingData` when fewer than 2 rows are
    /// available; a forest fitted on one point is a degenerate constant and
    /// must not be served.
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64]) -> Result<FittedForest> {
        if x.len() < 2 {
            return Err(PipelineError::InsufficientTrainingData { rows: x.len() });
        }
        debug_assert_eq!(x.len(), y.len());

        let n_features = x[0].len();
        for row in x {
            if row.len() != n_features {
                return Err(PipelineError::FeatureDimension {
                    expected: n_features,
                    actual: row.len(),
                });
            }
        }

        let n = x.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, &sample, n_features)
            })
            .collect();

        Ok(FittedForest { trees, n_features })
    }
}

/// A trained forest. Holds no reference to the training data; prediction is
/// the mean of the per-tree predictions.
#[derive(Debug, Clone)]
pub struct FittedForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl FittedForest {
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(PipelineError::FeatureDimension {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    /// Impurity-based feature importances, averaged over trees and
    /// normalized to sum to 1. Informational only.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (total, imp) in totals.iter_mut().zip(&tree.importances) {
                *total += imp;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for total in &mut totals {
                *total /= sum;
            }
        }
        totals
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }
}
