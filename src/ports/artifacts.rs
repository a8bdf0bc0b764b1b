//! Artifact port: Trait for persisting what training hands to serving.
//!
//! The fitted model and its feature schema always travel together; a store
//! must refuse to hand out a model with a schema it was not fitted against.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{FeatureSchema, LabelledAppointment, TrainingReport};

/// Trait for model, schema, dataset and report persistence.
pub trait ArtifactStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a fitted model bound to the schema it was trained on.
    ///
    /// # Errors
    /// Returns error if either artifact cannot be written.
    fn save_model<M: Serialize>(&self, model: &M, schema: &FeatureSchema) -> Result<(), Self::Error>;

    /// Load the model and its schema.
    ///
    /// # Errors
    /// Returns error if either artifact is missing, unreadable, or the model
    /// was fitted against a different schema.
    fn load_model<M: DeserializeOwned>(&self) -> Result<(M, FeatureSchema), Self::Error>;

    /// Persist the generated training dataset.
    ///
    /// # Errors
    /// Returns error if the dataset cannot be written.
    fn save_dataset(&self, rows: &[LabelledAppointment]) -> Result<(), Self::Error>;

    /// Persist the training report.
    ///
    /// # Errors
    /// Returns error if the report cannot be written.
    fn save_report(&self, report: &TrainingReport) -> Result<(), Self::Error>;

    /// Load the training report.
    ///
    /// # Returns
    /// `None` if no report has been written.
    ///
    /// # Errors
    /// Returns error if a report exists but cannot be read.
    fn load_report(&self) -> Result<Option<TrainingReport>, Self::Error>;
}
