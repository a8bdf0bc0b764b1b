//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the two halves of the system: offline training and online scoring.

mod cohort;
mod scoring;
mod training;

pub use cohort::CohortGenerator;
pub use scoring::ScoringService;
pub use training::{stratified_split, Split, TrainingConfig, TrainingOutcome, TrainingService};
