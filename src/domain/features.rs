//! Feature encoding shared by training and serving.
//!
//! Training and serving must build exactly the same column layout. The
//! [`FeatureSchema`] fixed at training time is the only authority on which
//! columns exist and in what order; serving never derives its own layout.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::appointment::AppointmentRecord;

/// Numeric fields passed through unchanged, in record order.
pub const NUMERIC_FEATURES: [&str; 4] = ["age", "hour", "day_of_week", "lead_time"];

/// Categorical fields expanded into one-hot columns, in record order.
pub const CATEGORICAL_FEATURES: [&str; 2] = ["hcp_type", "appt_mode"];

/// Column name for a one-hot indicator: `<field>_<category>`.
#[must_use]
pub fn one_hot_key(field: &str, category: &str) -> String {
    format!("{field}_{category}")
}

/// Sparse encoding of a single record: feature name to value.
///
/// Holds one key per numeric field and one `<field>_<category>` key per
/// categorical field. Absent one-hot keys are implicitly 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedFeatures {
    values: BTreeMap<String, f64>,
}

impl EncodedFeatures {
    /// One-hot encode the categorical fields and pass numeric fields through.
    ///
    /// Category strings are used verbatim; nothing is rejected here.
    #[must_use]
    pub fn encode(record: &AppointmentRecord) -> Self {
        let mut values = BTreeMap::new();

        let numeric = [record.age, record.hour, record.day_of_week, record.lead_time];
        for (name, value) in NUMERIC_FEATURES.iter().zip(numeric) {
            values.insert((*name).to_string(), f64::from(value));
        }

        let categorical = [record.hcp_type.as_str(), record.appt_mode.as_str()];
        for (field, category) in CATEGORICAL_FEATURES.iter().zip(categorical) {
            values.insert(one_hot_key(field, category), 1.0);
        }

        Self { values }
    }

    /// Value for a feature name, if the encoding produced it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Iterate over the produced feature names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Errors raised when constructing a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Feature schema must contain at least one column")]
    Empty,

    #[error("Duplicate feature column: {0}")]
    Duplicate(String),
}

/// Ordered feature names fixed at training time.
///
/// Persisted next to the model and used to align every serving request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema from an explicit ordered list of names.
    ///
    /// # Errors
    /// Returns error if the list is empty or contains duplicates.
    pub fn new(names: Vec<String>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = BTreeSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }
        Ok(Self { names })
    }

    /// Derive the training schema from the records it will be fitted on.
    ///
    /// Layout: numeric columns in record order, then for each categorical
    /// field the categories observed in `records`, sorted.
    #[must_use]
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AppointmentRecord>,
    {
        let mut hcp_types = BTreeSet::new();
        let mut appt_modes = BTreeSet::new();
        for record in records {
            hcp_types.insert(record.hcp_type.as_str());
            appt_modes.insert(record.appt_mode.as_str());
        }

        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|n| (*n).to_string()).collect();
        for (field, categories) in CATEGORICAL_FEATURES.iter().zip([hcp_types, appt_modes]) {
            names.extend(categories.into_iter().map(|c| one_hot_key(field, c)));
        }

        Self { names }
    }

    /// Ordered column names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Reconcile an encoded record with this schema.
    ///
    /// Output is always `self.len()` long and in schema order. Schema columns
    /// the encoding did not produce are 0; encoded keys the schema does not
    /// know (unseen categories) are dropped without error.
    #[must_use]
    pub fn align(&self, encoded: &EncodedFeatures) -> Vec<f64> {
        self.names
            .iter()
            .map(|name| encoded.get(name).unwrap_or(0.0))
            .collect()
    }

    /// Encode and align in one step.
    #[must_use]
    pub fn vectorize(&self, record: &AppointmentRecord) -> Vec<f64> {
        self.align(&EncodedFeatures::encode(record))
    }

    /// SHA-256 over the ordered names, used to bind a model to this schema.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names
    }
}
