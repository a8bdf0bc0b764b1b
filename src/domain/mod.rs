//! Domain layer: Core business types and logic.
//!
//! Pure types shared by the training pipeline and the scoring service.
//! Nothing here performs I/O or draws random numbers.

mod appointment;
mod assessment;
mod cohort;
mod features;
mod report;

pub use appointment::{
    AppointmentRecord, LabelledAppointment, AGE_RANGE, APPT_MODES, DAY_OF_WEEK_RANGE, HCP_TYPES,
    HOUR_RANGE, LEAD_TIME_RANGE,
};
pub use assessment::{RiskAssessment, RiskLevel, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
pub use cohort::{
    CategoryRate, ClippedExponential, ClippedNormal, CohortConfig, CohortConfigError, LabelModel,
    UniformRange,
};
pub use features::{
    one_hot_key, EncodedFeatures, FeatureSchema, SchemaError, CATEGORICAL_FEATURES,
    NUMERIC_FEATURES,
};
pub use report::{accuracy, TrainingReport};
