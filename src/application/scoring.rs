//! Scoring service: Serves DNA risk for single appointments.
//!
//! The service is an immutable context built once at startup and shared
//! read-only by every request handler. It either holds a model together with
//! the schema it was fitted against, or records why no model is available; in
//! the latter case every scoring request fails while introspection keeps
//! working.

use serde::de::DeserializeOwned;

use crate::domain::{AppointmentRecord, FeatureSchema, RiskAssessment, TrainingReport};
use crate::ports::{ArtifactStore, FittedModel, ScorerError};
use crate::DnaError;

enum ModelState<M> {
    Ready { model: M, schema: FeatureSchema },
    Unavailable { reason: String },
}

/// Service for scoring appointments with a fitted model.
pub struct ScoringService<M>
where
    M: FittedModel,
{
    state: ModelState<M>,
    report: Option<TrainingReport>,
}

impl<M> ScoringService<M>
where
    M: FittedModel,
{
    /// Create a ready service from a model and the schema it was fitted on.
    ///
    /// # Errors
    /// Returns `DnaError::ModelNotLoaded` if the model parameters are
    /// inconsistent or its width differs from the schema.
    pub fn new(model: M, schema: FeatureSchema) -> crate::Result<Self> {
        model
            .validate()
            .map_err(|e| DnaError::ModelNotLoaded(format!("Invalid model parameters: {e}")))?;
        if model.n_features() != schema.len() {
            return Err(DnaError::ModelNotLoaded(format!(
                "Model expects {} features but schema has {}",
                model.n_features(),
                schema.len()
            )));
        }
        Ok(Self {
            state: ModelState::Ready { model, schema },
            report: None,
        })
    }

    /// Create a service that rejects every scoring request.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unavailable {
                reason: reason.into(),
            },
            report: None,
        }
    }

    /// Load model, schema and report from a store.
    ///
    /// Never fails: if the model or schema cannot be loaded the service starts
    /// in the unavailable state and the reason is logged.
    pub fn load<A>(store: &A) -> Self
    where
        M: DeserializeOwned,
        A: ArtifactStore,
        A::Error: Into<crate::adapters::StorageError>,
    {
        tracing::info!("Loading model...");

        let service = match store.load_model::<M>() {
            Ok((model, schema)) => Self::new(model, schema),
            Err(e) => {
                let e: crate::adapters::StorageError = e.into();
                Err(DnaError::ModelNotLoaded(e.to_string()))
            }
        };

        let service = match service {
            Ok(s) => {
                tracing::info!("Model loaded successfully");
                s
            }
            Err(e) => {
                tracing::error!("Model unavailable: {}", e);
                return Self::unavailable(e.to_string());
            }
        };

        let report = match store.load_report() {
            Ok(report) => report,
            Err(e) => {
                let e: crate::adapters::StorageError = e.into();
                tracing::warn!("Failed to load training report: {}", e);
                None
            }
        };

        service.with_report(report)
    }

    /// Attach the training report served by the statistics route.
    #[must_use]
    pub fn with_report(mut self, report: Option<TrainingReport>) -> Self {
        self.report = report;
        self
    }

    /// Whether a model is loaded and scoring requests can succeed.
    #[must_use]
    pub fn is_model_loaded(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    /// Why the model is unavailable, if it is.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Ready { .. } => None,
            ModelState::Unavailable { reason } => Some(reason),
        }
    }

    #[must_use]
    pub fn schema(&self) -> Option<&FeatureSchema> {
        match &self.state {
            ModelState::Ready { schema, .. } => Some(schema),
            ModelState::Unavailable { .. } => None,
        }
    }

    /// Width of the loaded schema, or 0 when no model is loaded.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.schema().map_or(0, FeatureSchema::len)
    }

    #[must_use]
    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// Score one appointment.
    ///
    /// Pipeline: validate, encode, align to the training schema, score,
    /// classify. Either a complete assessment is returned or nothing.
    ///
    /// # Errors
    /// - `DnaError::ModelNotLoaded` if the service has no model
    /// - `DnaError::Validation` if a numeric field is out of range
    /// - `DnaError::Scoring` if the scorer fails or returns an invalid probability
    pub fn predict(&self, record: &AppointmentRecord) -> crate::Result<RiskAssessment> {
        let (model, schema) = match &self.state {
            ModelState::Ready { model, schema } => (model, schema),
            ModelState::Unavailable { reason } => {
                return Err(DnaError::ModelNotLoaded(reason.clone()));
            }
        };

        record
            .validate()
            .map_err(|errors| DnaError::Validation(errors.join("; ")))?;

        let rows = [schema.vectorize(record)];

        let probability = single(model.predict_probability(&rows)?)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ScorerError::ProbabilityOutOfRange(probability).into());
        }
        let prediction = single(model.predict(&rows)?)?;

        let assessment = RiskAssessment::new(probability, prediction);
        tracing::debug!(
            "Scored appointment: probability={:.3}, risk={}",
            probability,
            assessment.risk_level
        );
        Ok(assessment)
    }
}

fn single<T>(outputs: Vec<T>) -> Result<T, ScorerError> {
    let got = outputs.len();
    match <[T; 1]>::try_from(outputs) {
        Ok([value]) => Ok(value),
        Err(_) => Err(ScorerError::OutputLength { expected: 1, got }),
    }
}
