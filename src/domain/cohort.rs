//! Parameters of the synthetic appointment cohort.
//!
//! Defaults reproduce published NHS DNA rates per professional type and
//! delivery mode, combined through a multiplicative risk-factor model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::appointment::AppointmentRecord;

/// Tolerance when checking that selection weights sum to 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Errors raised by [`CohortConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CohortConfigError {
    #[error("{field}: at least one category is required")]
    NoCategories { field: &'static str },

    #[error("{field}: duplicate category {name:?}")]
    DuplicateCategory { field: &'static str, name: String },

    #[error("{field}: weight for {name:?} must be finite and non-negative, got {weight}")]
    InvalidWeight {
        field: &'static str,
        name: String,
        weight: f64,
    },

    #[error("{field}: selection weights must sum to 1, got {sum}")]
    WeightSum { field: &'static str, sum: f64 },

    #[error("{field}: base rate for {name:?} must be within [0, 1], got {rate}")]
    InvalidRate {
        field: &'static str,
        name: String,
        rate: f64,
    },

    #[error("{field}: {reason}")]
    InvalidDistribution { field: &'static str, reason: String },

    #[error("label model: {0}")]
    InvalidLabelModel(String),
}

/// One category with its baseline DNA rate and selection probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRate {
    pub name: String,
    pub base_rate: f64,
    pub weight: f64,
}

impl CategoryRate {
    #[must_use]
    pub fn new(name: impl Into<String>, base_rate: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            base_rate,
            weight,
        }
    }
}

/// Normal distribution clipped to `[min, max]` then truncated to an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClippedNormal {
    pub mean: f64,
    pub std_dev: f64,
    pub min: i32,
    pub max: i32,
}

/// Exponential distribution clipped to `[0, max]` then truncated to an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClippedExponential {
    pub mean: f64,
    pub max: i32,
}

/// Inclusive integer range drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: i32,
    pub max: i32,
}

/// Multiplicative risk-factor model producing a per-record DNA probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelModel {
    /// Mode rate that maps to a mode factor of 1.0
    pub reference_mode_rate: f64,
    /// Ages strictly below this get `young_factor`
    pub young_age: i32,
    pub young_factor: f64,
    /// Ages strictly above this get `old_factor`
    pub old_age: i32,
    pub old_factor: f64,
    /// Hours strictly below this get `early_factor`
    pub early_hour: i32,
    pub early_factor: f64,
    /// Lead times strictly above this get `long_lead_factor`
    pub long_lead_days: i32,
    pub long_lead_factor: f64,
    /// Upper bound on the combined probability
    pub cap: f64,
}

impl Default for LabelModel {
    fn default() -> Self {
        Self {
            reference_mode_rate: 0.075,
            young_age: 30,
            young_factor: 1.3,
            old_age: 65,
            old_factor: 0.9,
            early_hour: 10,
            early_factor: 1.2,
            long_lead_days: 14,
            long_lead_factor: 1.1,
            cap: 0.25,
        }
    }
}

impl LabelModel {
    /// DNA probability for a record given the base rates of its categories.
    ///
    /// `min(cap, hcp_rate * mode_rate / reference_mode_rate * age * time * lead)`
    #[must_use]
    pub fn dna_probability(&self, hcp_rate: f64, mode_rate: f64, record: &AppointmentRecord) -> f64 {
        let mode_factor = mode_rate / self.reference_mode_rate;
        let age_factor = if record.age < self.young_age {
            self.young_factor
        } else if record.age > self.old_age {
            self.old_factor
        } else {
            1.0
        };
        let time_factor = if record.hour < self.early_hour {
            self.early_factor
        } else {
            1.0
        };
        let lead_factor = if record.lead_time > self.long_lead_days {
            self.long_lead_factor
        } else {
            1.0
        };

        (hcp_rate * mode_factor * age_factor * time_factor * lead_factor).min(self.cap)
    }

    fn validate(&self) -> Result<(), CohortConfigError> {
        if !(self.reference_mode_rate.is_finite() && self.reference_mode_rate > 0.0) {
            return Err(CohortConfigError::InvalidLabelModel(format!(
                "reference_mode_rate must be positive, got {}",
                self.reference_mode_rate
            )));
        }
        if !(self.cap > 0.0 && self.cap <= 1.0) {
            return Err(CohortConfigError::InvalidLabelModel(format!(
                "cap must be within (0, 1], got {}",
                self.cap
            )));
        }
        let factors = [
            self.young_factor,
            self.old_factor,
            self.early_factor,
            self.long_lead_factor,
        ];
        if factors.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(CohortConfigError::InvalidLabelModel(
                "factors must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Full description of the synthetic cohort.
///
/// Deserialization fills omitted fields with the reference values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    pub hcp_types: Vec<CategoryRate>,
    pub appt_modes: Vec<CategoryRate>,
    pub age: ClippedNormal,
    pub hour: UniformRange,
    pub day_of_week: UniformRange,
    pub lead_time: ClippedExponential,
    pub label_model: LabelModel,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            hcp_types: vec![
                CategoryRate::new("GP", 0.072, 0.50),
                CategoryRate::new("Nurse", 0.065, 0.30),
                CategoryRate::new("Other Practice staff", 0.080, 0.16),
                CategoryRate::new("Mental Health", 0.110, 0.04),
            ],
            appt_modes: vec![
                CategoryRate::new("Face-to-face", 0.075, 0.60),
                CategoryRate::new("Telephone", 0.068, 0.30),
                CategoryRate::new("Video/Online", 0.082, 0.10),
            ],
            age: ClippedNormal {
                mean: 45.0,
                std_dev: 20.0,
                min: 0,
                max: 100,
            },
            hour: UniformRange { min: 8, max: 17 },
            day_of_week: UniformRange { min: 0, max: 4 },
            lead_time: ClippedExponential { mean: 7.0, max: 60 },
            label_model: LabelModel::default(),
        }
    }
}

impl CohortConfig {
    /// Check every parameter before any sampling happens.
    ///
    /// # Errors
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> Result<(), CohortConfigError> {
        validate_categories("hcp_types", &self.hcp_types)?;
        validate_categories("appt_modes", &self.appt_modes)?;

        if !(self.age.std_dev.is_finite() && self.age.std_dev > 0.0 && self.age.mean.is_finite()) {
            return Err(CohortConfigError::InvalidDistribution {
                field: "age",
                reason: format!(
                    "mean must be finite and std_dev positive, got mean={} std_dev={}",
                    self.age.mean, self.age.std_dev
                ),
            });
        }
        check_bounds("age", self.age.min, self.age.max)?;
        check_bounds("hour", self.hour.min, self.hour.max)?;
        check_bounds("day_of_week", self.day_of_week.min, self.day_of_week.max)?;

        if !(self.lead_time.mean.is_finite() && self.lead_time.mean > 0.0) {
            return Err(CohortConfigError::InvalidDistribution {
                field: "lead_time",
                reason: format!("mean must be positive, got {}", self.lead_time.mean),
            });
        }
        check_bounds("lead_time", 0, self.lead_time.max)?;

        self.label_model.validate()
    }

    /// Base DNA rate of an hcp_type category, if configured.
    #[must_use]
    pub fn hcp_rate(&self, name: &str) -> Option<f64> {
        rate_of(&self.hcp_types, name)
    }

    /// Base DNA rate of an appt_mode category, if configured.
    #[must_use]
    pub fn mode_rate(&self, name: &str) -> Option<f64> {
        rate_of(&self.appt_modes, name)
    }

    /// DNA probability of a record under this cohort's label model.
    ///
    /// Returns `None` when either category is not part of the cohort.
    #[must_use]
    pub fn dna_probability(&self, record: &AppointmentRecord) -> Option<f64> {
        let hcp_rate = self.hcp_rate(&record.hcp_type)?;
        let mode_rate = self.mode_rate(&record.appt_mode)?;
        Some(self.label_model.dna_probability(hcp_rate, mode_rate, record))
    }
}

fn rate_of(categories: &[CategoryRate], name: &str) -> Option<f64> {
    categories
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.base_rate)
}

fn check_bounds(field: &'static str, min: i32, max: i32) -> Result<(), CohortConfigError> {
    if min > max {
        return Err(CohortConfigError::InvalidDistribution {
            field,
            reason: format!("min {min} exceeds max {max}"),
        });
    }
    Ok(())
}

fn validate_categories(
    field: &'static str,
    categories: &[CategoryRate],
) -> Result<(), CohortConfigError> {
    if categories.is_empty() {
        return Err(CohortConfigError::NoCategories { field });
    }

    let mut seen = BTreeSet::new();
    let mut sum = 0.0;
    for c in categories {
        if !seen.insert(c.name.as_str()) {
            return Err(CohortConfigError::DuplicateCategory {
                field,
                name: c.name.clone(),
            });
        }
        if !c.weight.is_finite() || c.weight < 0.0 {
            return Err(CohortConfigError::InvalidWeight {
                field,
                name: c.name.clone(),
                weight: c.weight,
            });
        }
        if !(0.0..=1.0).contains(&c.base_rate) {
            return Err(CohortConfigError::InvalidRate {
                field,
                name: c.name.clone(),
                rate: c.base_rate,
            });
        }
        sum += c.weight;
    }

    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(CohortConfigError::WeightSum { field, sum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: i32, hour: i32, lead_time: i32) -> AppointmentRecord {
        AppointmentRecord {
            hcp_type: "GP".into(),
            appt_mode: "Face-to-face".into(),
            age,
            hour,
            day_of_week: 0,
            lead_time,
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(CohortConfig::default().validate().is_ok());
    }

    #[test]
    fn test_neutral_record_gets_base_rate() {
        let cfg = CohortConfig::default();
        let p = cfg.dna_probability(&record(45, 12, 3)).expect("known categories");
        assert!((p - 0.072).abs() < 1e-12);
    }

    #[test]
    fn test_factors_multiply() {
        let cfg = CohortConfig::default();
        let young_early_long = AppointmentRecord {
            hcp_type: "Mental Health".into(),
            appt_mode: "Video/Online".into(),
            ..record(22, 9, 20)
        };
        let expected = 0.110 * (0.082 / 0.075) * 1.3 * 1.2 * 1.1;
        let p = cfg.dna_probability(&young_early_long).expect("known categories");
        assert!((p - expected).abs() < 1e-12);

        // Boundaries are strict: 30, 65, 10 and 14 are all neutral.
        let edges = cfg.dna_probability(&record(30, 10, 14)).expect("known");
        assert!((edges - 0.072).abs() < 1e-12);
        let old = cfg.dna_probability(&record(66, 10, 14)).expect("known");
        assert!((old - 0.072 * 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_probability_is_capped() {
        let model = LabelModel {
            young_factor: 10.0,
            ..LabelModel::default()
        };
        let p = model.dna_probability(0.11, 0.082, &record(20, 9, 30));
        assert!((p - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_category_has_no_probability() {
        let cfg = CohortConfig::default();
        let locum = AppointmentRecord {
            hcp_type: "Locum".into(),
            ..record(40, 12, 2)
        };
        assert!(cfg.dna_probability(&locum).is_none());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut cfg = CohortConfig::default();
        cfg.hcp_types[0].weight = 0.6;
        assert!(matches!(
            cfg.validate(),
            Err(CohortConfigError::WeightSum { field: "hcp_types", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let mut cfg = CohortConfig::default();
        cfg.appt_modes[1].base_rate = 1.5;
        assert!(matches!(cfg.validate(), Err(CohortConfigError::InvalidRate { .. })));

        let mut cfg = CohortConfig::default();
        cfg.appt_modes.push(CategoryRate::new("Telephone", 0.07, 0.0));
        assert!(matches!(
            cfg.validate(),
            Err(CohortConfigError::DuplicateCategory { .. })
        ));

        let mut cfg = CohortConfig::default();
        cfg.hour = UniformRange { min: 18, max: 8 };
        assert!(matches!(
            cfg.validate(),
            Err(CohortConfigError::InvalidDistribution { field: "hour", .. })
        ));

        let mut cfg = CohortConfig::default();
        cfg.label_model.cap = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(CohortConfigError::InvalidLabelModel(_))
        ));
    }

    #[test]
    fn test_config_json_roundtrip_without_label_model() {
        let mut json = serde_json::to_value(CohortConfig::default()).expect("serialize");
        json.as_object_mut().expect("object").remove("label_model");

        let cfg: CohortConfig = serde_json::from_value(json).expect("deserialize");
        assert_eq!(cfg.label_model, LabelModel::default());
    }
}
