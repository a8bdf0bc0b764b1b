//! Training utility for the DNA predictor.
//!
//! Generates a synthetic cohort, fits a logistic regression and writes the
//! dataset, model, schema and training report.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin train_model -- --rows 10000 --seed 42 --model-dir model
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use dna_predictor::adapters::fs::FsArtifactStore;
use dna_predictor::adapters::logistic::{LogisticConfig, LogisticRegression};
use dna_predictor::application::{TrainingConfig, TrainingService};
use dna_predictor::config::{load_cohort_config, LogConfig};

#[derive(Debug, Parser)]
#[command(
    name = "train_model",
    about = "Generate a synthetic cohort and train the DNA risk model"
)]
struct Cli {
    /// Number of synthetic appointments to generate
    #[arg(long, default_value_t = 10_000)]
    rows: usize,

    /// Seed for cohort generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Share of each class held out for evaluation
    #[arg(long = "test-fraction", default_value_t = 0.2)]
    test_fraction: f64,

    /// Seed for the train/test shuffle
    #[arg(long = "split-seed", default_value_t = 42)]
    split_seed: u64,

    /// Directory receiving the model, schema and report
    #[arg(long = "model-dir", value_name = "DIR", default_value = "model")]
    model_dir: PathBuf,

    /// Directory receiving the generated dataset
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// JSON file overriding the cohort parameters
    #[arg(long = "cohort-config", value_name = "FILE")]
    cohort_config: Option<PathBuf>,

    /// Gradient descent epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Gradient descent step size
    #[arg(long = "learning-rate")]
    learning_rate: Option<f64>,
}

impl Cli {
    fn training_config(&self) -> Result<TrainingConfig> {
        let cohort = match &self.cohort_config {
            Some(path) => load_cohort_config(path)
                .with_context(|| format!("Failed to load cohort config {}", path.display()))?,
            None => TrainingConfig::default().cohort,
        };
        Ok(TrainingConfig {
            rows: self.rows,
            seed: self.seed,
            test_fraction: self.test_fraction,
            split_seed: self.split_seed,
            cohort,
        })
    }

    fn logistic_config(&self) -> LogisticConfig {
        let defaults = LogisticConfig::default();
        LogisticConfig {
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            epochs: self.epochs.unwrap_or(defaults.epochs),
            l2: defaults.l2,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = dna_predictor::logging::init(&LogConfig::from_env_or_default())
        .context("Failed to initialise logging")?;

    let config = cli.training_config()?;
    let store = Arc::new(FsArtifactStore::new(&cli.model_dir, &cli.data_dir));
    let service = TrainingService::new(LogisticRegression::new(cli.logistic_config()), store);

    let outcome = service.run(&config).context("Training failed")?;

    println!("Model trained on {} appointments", outcome.report.training_size);
    println!("  DNA rate:          {:.2}%", outcome.report.dna_rate * 100.0);
    println!(
        "  Training accuracy: {:.2}%",
        outcome.report.train_accuracy * 100.0
    );
    println!("  Test accuracy:     {:.2}%", outcome.report.test_accuracy * 100.0);
    println!("  Features:          {}", outcome.schema.len());
    println!("  Artifacts:         {}", cli.model_dir.display());

    Ok(())
}
