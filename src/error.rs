use thiserror::Error;

/// Error taxonomy for the ranking pipeline.
///
/// Callers need to tell a data-pipeline failure (`Store`, `EmptyUniverse`)
/// from a modeling failure (`InsufficientTrainingData`); the presentation
/// layer reports them differently.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The backing store is unreachable or a query failed. Propagated as-is,
    /// no retry: ranking cannot proceed without data.
    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),

    /// The stock universe query matched no rows.
    #[error("no stocks found with valuation '{valuation}'")]
    EmptyUniverse { valuation: String },

    /// Fewer than 2 usable rows survived feature filtering. No model object
    /// is produced; stale or partial results must not be presented.
    #[error("insufficient training data: {rows} usable rows, need at least 2")]
    InsufficientTrainingData { rows: usize },

    /// A prediction was requested with a matrix width different from the one
    /// the model was trained on.
    #[error("feature dimension mismatch: model expects {expected} features, got {actual}")]
    FeatureDimension { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
