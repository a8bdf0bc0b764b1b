//! Filesystem adapter: Implementation of ArtifactStore.
//!
//! Layout:
//! - `<model_dir>/dna_model.json`: model envelope (format version, schema
//!   fingerprint, training timestamp, model parameters)
//! - `<model_dir>/feature_columns.json`: ordered feature names
//! - `<model_dir>/training_report.json`: metrics of the run
//! - `<data_dir>/nhs_data.csv`: generated training dataset
//!
//! The envelope pins the SHA-256 fingerprint of the schema the model was
//! fitted against. Loading fails closed if the schema on disk differs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, LabelledAppointment, TrainingReport};
use crate::ports::ArtifactStore;

pub const MODEL_FILE: &str = "dna_model.json";
pub const SCHEMA_FILE: &str = "feature_columns.json";
pub const REPORT_FILE: &str = "training_report.json";
pub const DATASET_FILE: &str = "nhs_data.csv";

/// Current model envelope format.
const MODEL_FORMAT_VERSION: u32 = 1;

const CSV_HEADER: [&str; 7] = [
    "hcp_type",
    "appt_mode",
    "age",
    "hour",
    "day_of_week",
    "lead_time",
    "dna",
];

/// Error type for artifact storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Artifact not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Serialization error in {path:?}: {message}")]
    Serialization { path: PathBuf, message: String },

    #[error("Unsupported model format version: {0}")]
    UnsupportedVersion(u32),

    #[error("Model was fitted against schema {expected} but {found} was loaded")]
    SchemaMismatch { expected: String, found: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelEnvelope<M> {
    format_version: u32,
    schema_sha256: String,
    saved_at: chrono::DateTime<chrono::Utc>,
    model: M,
}

/// Artifact store backed by two local directories.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    model_dir: PathBuf,
    data_dir: PathBuf,
}

impl FsArtifactStore {
    /// Create a store; directories are created lazily on first write.
    pub fn new(model_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(DATASET_FILE)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serialization {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        write_file(path, &bytes)
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StorageError> {
        if !path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&content).map_err(|e| StorageError::Serialization {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, bytes).map_err(io_err)
}

/// One dataset line; `LabelledAppointment` flattens its record, which the
/// CSV serializer does not support.
#[derive(Serialize)]
struct DatasetRow<'a> {
    hcp_type: &'a str,
    appt_mode: &'a str,
    age: i32,
    hour: i32,
    day_of_week: i32,
    lead_time: i32,
    dna: u8,
}

impl<'a> From<&'a LabelledAppointment> for DatasetRow<'a> {
    fn from(row: &'a LabelledAppointment) -> Self {
        let r = &row.record;
        Self {
            hcp_type: &r.hcp_type,
            appt_mode: &r.appt_mode,
            age: r.age,
            hour: r.hour,
            day_of_week: r.day_of_week,
            lead_time: r.lead_time,
            dna: row.dna,
        }
    }
}

/// Write labelled appointments as CSV with a header row.
///
/// The header is written even when `rows` is empty.
///
/// # Errors
/// Returns any error from the underlying writer.
pub fn write_csv<W: Write>(rows: &[LabelledAppointment], writer: W) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for row in rows {
        wtr.serialize(DatasetRow::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

impl ArtifactStore for FsArtifactStore {
    type Error = StorageError;

    fn save_model<M: Serialize>(&self, model: &M, schema: &FeatureSchema) -> Result<(), StorageError> {
        let envelope = ModelEnvelope {
            format_version: MODEL_FORMAT_VERSION,
            schema_sha256: schema.fingerprint(),
            saved_at: chrono::Utc::now(),
            model,
        };
        // Schema first: a model file never exists without its schema.
        self.write_json(&self.model_dir.join(SCHEMA_FILE), schema)?;
        self.write_json(&self.model_dir.join(MODEL_FILE), &envelope)?;

        tracing::info!(
            "Saved model and {} feature columns to {:?}",
            schema.len(),
            self.model_dir
        );
        Ok(())
    }

    fn load_model<M: DeserializeOwned>(&self) -> Result<(M, FeatureSchema), StorageError> {
        let envelope: ModelEnvelope<M> = self.read_json(&self.model_dir.join(MODEL_FILE))?;
        if envelope.format_version != MODEL_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(envelope.format_version));
        }

        let schema: FeatureSchema = self.read_json(&self.model_dir.join(SCHEMA_FILE))?;
        let found = schema.fingerprint();
        if found != envelope.schema_sha256 {
            return Err(StorageError::SchemaMismatch {
                expected: envelope.schema_sha256,
                found,
            });
        }

        tracing::info!(
            "Loaded model from {:?} (saved_at={}, n_features={})",
            self.model_dir,
            envelope.saved_at,
            schema.len()
        );
        Ok((envelope.model, schema))
    }

    fn save_dataset(&self, rows: &[LabelledAppointment]) -> Result<(), StorageError> {
        let path = self.dataset_path();
        let mut buf = Vec::with_capacity(rows.len() * 48);
        write_csv(rows, &mut buf).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        write_file(&path, &buf)?;

        tracing::info!("Saved {} records to {:?}", rows.len(), path);
        Ok(())
    }

    fn save_report(&self, report: &TrainingReport) -> Result<(), StorageError> {
        self.write_json(&self.model_dir.join(REPORT_FILE), report)
    }

    fn load_report(&self) -> Result<Option<TrainingReport>, StorageError> {
        match self.read_json(&self.model_dir.join(REPORT_FILE)) {
            Ok(report) => Ok(Some(report)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
