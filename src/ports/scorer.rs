//! Scorer port: Trait for the classifier behind the pipeline.
//!
//! Training and serving only rely on this contract, so any classifier that can
//! be fitted on aligned feature rows and return a positive-class probability
//! can be substituted without touching feature alignment or risk tiers.

/// Errors that can occur while fitting or scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScorerError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Got {rows} feature rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("Labels must be 0 or 1, got {0}")]
    InvalidLabel(u8),

    #[error("Feature row has {got} columns, model expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Non-finite value encountered: {0}")]
    NonFinite(String),

    #[error("Scorer returned {got} outputs for {expected} rows")]
    OutputLength { expected: usize, got: usize },

    #[error("Probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(f64),
}

/// Probability cut-off used to derive the binary class.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A fitted model that scores aligned feature rows.
///
/// Implementations must be immutable after fitting: a single instance is
/// shared read-only across concurrent requests.
pub trait FittedModel: Send + Sync {
    /// Number of columns each input row must have.
    fn n_features(&self) -> usize;

    /// Check internal consistency of parameters loaded from storage.
    ///
    /// # Errors
    /// Returns error if the parameters cannot produce valid scores.
    fn validate(&self) -> Result<(), ScorerError> {
        Ok(())
    }

    /// Probability of the positive (DNA) class for each row.
    ///
    /// # Errors
    /// Returns `ScorerError::DimensionMismatch` if a row has the wrong width.
    fn predict_probability(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ScorerError>;

    /// Binary class for each row.
    ///
    /// # Errors
    /// Propagates errors from [`FittedModel::predict_probability`].
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<u8>, ScorerError> {
        Ok(self
            .predict_probability(rows)?
            .into_iter()
            .map(|p| u8::from(p >= DECISION_THRESHOLD))
            .collect())
    }
}

/// Trait for fitting a classifier.
pub trait Scorer: Send + Sync {
    /// The fitted model type produced by this scorer.
    type Model: FittedModel;

    /// Short human-readable name, recorded in the training report.
    fn name(&self) -> &str;

    /// Fit on aligned feature rows and binary labels.
    ///
    /// # Errors
    /// Returns error if the inputs are empty, inconsistent, or contain labels
    /// other than 0 and 1.
    fn fit(&self, rows: &[Vec<f64>], labels: &[u8]) -> Result<Self::Model, ScorerError>;
}

/// Shared input checks for [`Scorer::fit`] implementations.
///
/// Returns the common row width.
///
/// # Errors
/// Returns the first inconsistency found.
pub fn check_training_input(rows: &[Vec<f64>], labels: &[u8]) -> Result<usize, ScorerError> {
    let Some(first) = rows.first() else {
        return Err(ScorerError::EmptyTrainingSet);
    };
    if rows.len() != labels.len() {
        return Err(ScorerError::LabelCountMismatch {
            rows: rows.len(),
            labels: labels.len(),
        });
    }
    if let Some(bad) = labels.iter().find(|l| **l > 1) {
        return Err(ScorerError::InvalidLabel(*bad));
    }

    let width = first.len();
    for row in rows {
        if row.len() != width {
            return Err(ScorerError::DimensionMismatch {
                expected: width,
                got: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ScorerError::NonFinite("training feature".into()));
        }
    }
    Ok(width)
}
