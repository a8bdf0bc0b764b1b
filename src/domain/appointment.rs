//! Appointment record types for DNA (did-not-attend) risk prediction.
//!
//! Mirrors the fields of the NHS appointment extracts the model was designed
//! around: who the appointment is with, how it is delivered, and when.

use serde::{Deserialize, Serialize};

/// Healthcare professional types seen in the reference cohort.
pub const HCP_TYPES: [&str; 4] = ["GP", "Nurse", "Other Practice staff", "Mental Health"];

/// Appointment delivery modes seen in the reference cohort.
pub const APPT_MODES: [&str; 3] = ["Face-to-face", "Telephone", "Video/Online"];

/// Inclusive bounds for the numeric fields.
pub const AGE_RANGE: (i32, i32) = (0, 100);
pub const HOUR_RANGE: (i32, i32) = (8, 17);
pub const DAY_OF_WEEK_RANGE: (i32, i32) = (0, 4);
pub const LEAD_TIME_RANGE: (i32, i32) = (0, 60);

/// A single scheduled appointment.
///
/// Categorical fields are free text: values outside [`HCP_TYPES`] and
/// [`APPT_MODES`] are accepted and simply match no known feature column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    /// Healthcare professional type (e.g. "GP", "Nurse")
    pub hcp_type: String,

    /// Delivery mode (e.g. "Face-to-face", "Telephone")
    pub appt_mode: String,

    /// Patient age in years
    pub age: i32,

    /// Hour of day the appointment starts (24h clock)
    pub hour: i32,

    /// Day of week, 0 = Monday .. 4 = Friday
    pub day_of_week: i32,

    /// Days between booking and appointment
    pub lead_time: i32,
}

impl AppointmentRecord {
    /// Validate that every numeric field is within its expected range.
    ///
    /// # Errors
    /// Returns all range violations as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let checks = [
            ("age", self.age, AGE_RANGE),
            ("hour", self.hour, HOUR_RANGE),
            ("day_of_week", self.day_of_week, DAY_OF_WEEK_RANGE),
            ("lead_time", self.lead_time, LEAD_TIME_RANGE),
        ];
        for (name, value, (lo, hi)) in checks {
            if !(lo..=hi).contains(&value) {
                errors.push(format!("{name} {value} out of range [{lo}, {hi}]"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// An appointment together with its outcome, as produced for training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledAppointment {
    #[serde(flatten)]
    pub record: AppointmentRecord,

    /// 1 = patient did not attend, 0 = attended
    pub dna: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AppointmentRecord {
        AppointmentRecord {
            hcp_type: "GP".into(),
            appt_mode: "Telephone".into(),
            age: 45,
            hour: 9,
            day_of_week: 2,
            lead_time: 3,
        }
    }

    #[test]
    fn test_validation() {
        assert!(record().validate().is_ok());

        let invalid = AppointmentRecord {
            age: 101,
            hour: 7,
            day_of_week: 5,
            lead_time: -1,
            ..record()
        };
        let errors = invalid.validate().expect_err("all four fields out of range");
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("age 101"));
    }

    #[test]
    fn test_unknown_category_is_valid() {
        let locum = AppointmentRecord {
            hcp_type: "Locum".into(),
            ..record()
        };
        assert!(locum.validate().is_ok());
    }

    #[test]
    fn test_labelled_serializes_flat() {
        let labelled = LabelledAppointment {
            record: record(),
            dna: 1,
        };
        let json = serde_json::to_value(&labelled).expect("serialize");
        assert_eq!(json["hcp_type"], "GP");
        assert_eq!(json["dna"], 1);
    }
}
