//! # DNA Predictor
//!
//! Predicts the probability that a GP appointment will be missed
//! ("did not attend", DNA) and serves it over HTTP.
//!
//! This crate provides:
//! - A seeded synthetic cohort generator with a multiplicative risk-factor label model
//! - One-hot feature encoding aligned to a schema fixed at training time
//! - A pluggable scorer (logistic regression by default)
//! - Risk tiers with colours and follow-up recommendations
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (appointments, features, risk, cohort parameters)
//! - `ports`: Trait definitions for external operations (scorer, artifact store)
//! - `adapters`: Concrete implementations (logistic regression, filesystem)
//! - `application`: Use cases orchestrating domain and ports (training, scoring)
//! - `api`: HTTP routes

pub mod adapters;
pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;

pub use domain::{AppointmentRecord, RiskAssessment, RiskLevel};

/// Result type for DNA predictor operations
pub type Result<T> = std::result::Result<T, DnaError>;

/// Main error type for DNA predictor operations
#[derive(Debug, thiserror::Error)]
pub enum DnaError {
    #[error("Invalid appointment data: {0}")]
    Validation(String),

    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ports::ScorerError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DnaError {
    /// Whether the failure was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Scoring(_))
    }
}
