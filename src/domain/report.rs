//! Summary of a training run, persisted next to the model.

use serde::{Deserialize, Serialize};

/// Metrics and provenance of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Human-readable classifier name
    pub model_type: String,

    /// Number of generated records (train + test)
    pub training_size: usize,

    pub train_rows: usize,
    pub test_rows: usize,

    /// Fraction of generated records labelled DNA
    pub dna_rate: f64,

    pub train_accuracy: f64,
    pub test_accuracy: f64,

    /// Width of the feature schema
    pub n_features: usize,

    /// Seed used for cohort generation
    pub seed: u64,

    pub trained_at: chrono::DateTime<chrono::Utc>,
}

/// Fraction of `predicted` matching `actual`.
///
/// Returns 0.0 for empty input.
#[must_use]
pub fn accuracy(predicted: &[u8], actual: &[u8]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| p == a)
        .count();
    correct as f64 / actual.len() as f64
}
