//! Training service: Offline pipeline from synthetic cohort to persisted model.
//!
//! This service coordinates:
//! - Cohort generation and dataset persistence
//! - Schema construction and feature alignment
//! - Stratified train/test split
//! - Fitting and evaluation
//! - Model, schema and report persistence

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::cohort::CohortGenerator;
use crate::domain::{accuracy, CohortConfig, FeatureSchema, TrainingReport};
use crate::ports::{ArtifactStore, FittedModel, Scorer};
use crate::DnaError;

/// Parameters of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Number of synthetic appointments to generate
    pub rows: usize,
    /// Seed for cohort generation
    pub seed: u64,
    /// Share of each class held out for evaluation
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
    pub cohort: CohortConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            rows: 10_000,
            seed: 42,
            test_fraction: 0.2,
            split_seed: 42,
            cohort: CohortConfig::default(),
        }
    }
}

impl TrainingConfig {
    fn validate(&self) -> crate::Result<()> {
        if self.rows < 2 {
            return Err(DnaError::InvalidConfig(format!(
                "rows must be at least 2, got {}",
                self.rows
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(DnaError::InvalidConfig(format!(
                "test_fraction must be within (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome<M> {
    pub model: M,
    pub schema: FeatureSchema,
    pub report: TrainingReport,
}

/// Row indices of a train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so each class keeps its proportion in the test set.
///
/// Each class is shuffled and contributes `round(test_fraction * class_size)`
/// rows to the test set. Both index lists are returned sorted.
#[must_use]
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> Split {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut idx: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == class)
            .map(|(i, _)| i)
            .collect();
        idx.shuffle(&mut rng);

        let n_test = ((idx.len() as f64) * test_fraction).round() as usize;
        test.extend_from_slice(&idx[..n_test]);
        train.extend_from_slice(&idx[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

fn select<T: Clone>(items: &[T], idx: &[usize]) -> Vec<T> {
    idx.iter().map(|i| items[*i].clone()).collect()
}

/// Service for running the offline training pipeline.
pub struct TrainingService<S, A>
where
    S: Scorer,
    A: ArtifactStore,
{
    scorer: S,
    store: Arc<A>,
}

impl<S, A> TrainingService<S, A>
where
    S: Scorer,
    A: ArtifactStore,
    A::Error: Into<crate::adapters::StorageError>,
{
    /// Create a new training service.
    pub fn new(scorer: S, store: Arc<A>) -> Self {
        Self { scorer, store }
    }

    /// Run the full pipeline and persist every artifact.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, fitting fails, or any
    /// artifact cannot be written.
    pub fn run(&self, config: &TrainingConfig) -> crate::Result<TrainingOutcome<S::Model>>
    where
        S::Model: serde::Serialize,
    {
        config.validate()?;

        // Step 1: Generate cohort
        tracing::info!(
            "Generating {} synthetic appointments (seed={})...",
            config.rows,
            config.seed
        );
        let records = CohortGenerator::new(config.cohort.clone(), config.seed)
            .map_err(|e| DnaError::InvalidConfig(e.to_string()))?
            .generate(config.rows);

        let labels: Vec<u8> = records.iter().map(|r| r.dna).collect();
        let dna_rate = labels.iter().map(|l| f64::from(*l)).sum::<f64>() / records.len() as f64;
        tracing::info!("DNA rate: {:.2}%", dna_rate * 100.0);

        self.store
            .save_dataset(&records)
            .map_err(|e| DnaError::Storage(e.into()))?;

        // Step 2: Encode
        let schema = FeatureSchema::from_records(records.iter().map(|r| &r.record));
        let rows: Vec<Vec<f64>> = records.iter().map(|r| schema.vectorize(&r.record)).collect();
        tracing::info!("Features: {}", schema.len());

        // Step 3: Split
        let split = stratified_split(&labels, config.test_fraction, config.split_seed);
        let (x_train, y_train) = (select(&rows, &split.train), select(&labels, &split.train));
        let (x_test, y_test) = (select(&rows, &split.test), select(&labels, &split.test));
        tracing::info!("Split: {} train, {} test", x_train.len(), x_test.len());

        // Step 4: Fit
        tracing::info!("Training {}...", self.scorer.name());
        let model = self.scorer.fit(&x_train, &y_train)?;

        // Step 5: Evaluate
        let train_accuracy = accuracy(&model.predict(&x_train)?, &y_train);
        let test_accuracy = accuracy(&model.predict(&x_test)?, &y_test);
        tracing::info!(
            "Training accuracy: {:.2}%, test accuracy: {:.2}%",
            train_accuracy * 100.0,
            test_accuracy * 100.0
        );

        let report = TrainingReport {
            model_type: self.scorer.name().to_string(),
            training_size: records.len(),
            train_rows: x_train.len(),
            test_rows: x_test.len(),
            dna_rate,
            train_accuracy,
            test_accuracy,
            n_features: schema.len(),
            seed: config.seed,
            trained_at: chrono::Utc::now(),
        };

        // Step 6: Persist
        self.store
            .save_model(&model, &schema)
            .map_err(|e| DnaError::Storage(e.into()))?;
        self.store
            .save_report(&report)
            .map_err(|e| DnaError::Storage(e.into()))?;

        tracing::info!("Training complete");
        Ok(TrainingOutcome {
            model,
            schema,
            report,
        })
    }
}
