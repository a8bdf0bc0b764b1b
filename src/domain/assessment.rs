//! Risk assessment types.
//!
//! Turns a scored DNA probability into the tier, colour and follow-up action
//! returned to callers.

use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the Medium tier.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.08;

/// Lower bound (inclusive) of the High tier.
pub const HIGH_RISK_THRESHOLD: f64 = 0.15;

/// Risk level classification for a missed appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Below the Medium threshold
    Low,
    /// Between the Medium and High thresholds
    Medium,
    /// At or above the High threshold
    High,
}

impl RiskLevel {
    /// Classify a probability using half-open intervals
    /// `[0, 0.08)`, `[0.08, 0.15)`, `[0.15, 1]`.
    ///
    /// Boundary values belong to the upper tier.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < MEDIUM_RISK_THRESHOLD {
            Self::Low
        } else if probability < HIGH_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Display colour sent alongside the tier.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Medium => "orange",
            Self::High => "red",
        }
    }

    /// Recommended follow-up for the practice.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "Standard reminder process sufficient",
            Self::Medium => "Send confirmation SMS 24 hours before",
            Self::High => "Call patient to confirm + send SMS",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Scoring outcome returned for one appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Binary class from the model (0 = attends, 1 = DNA)
    pub prediction: u8,

    /// DNA probability, rounded to 3 decimals
    pub probability: f64,

    /// Risk tier derived from the unrounded probability
    pub risk_level: RiskLevel,

    /// Colour paired with the tier
    pub color: String,

    /// Follow-up action paired with the tier
    pub recommendation: String,
}

impl RiskAssessment {
    /// Build an assessment from a model probability and class.
    #[must_use]
    pub fn new(probability: f64, prediction: u8) -> Self {
        let risk_level = RiskLevel::from_probability(probability);
        Self {
            prediction,
            probability: round_to(probability, 3),
            risk_level,
            color: risk_level.color().to_string(),
            recommendation: risk_level.recommendation().to_string(),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
