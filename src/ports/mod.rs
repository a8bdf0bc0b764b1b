//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (classifier, artifact storage).

mod artifacts;
mod scorer;

pub use artifacts::ArtifactStore;
pub use scorer::{check_training_input, FittedModel, Scorer, ScorerError, DECISION_THRESHOLD};
