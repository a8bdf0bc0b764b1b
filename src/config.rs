//! Runtime configuration for the scoring server.
//!
//! Supported environment variables:
//! - `DNA_MODEL_DIR`: directory holding the model artifacts (default `model`)
//! - `DNA_BIND_ADDR`: listen address (default `127.0.0.1:8000`)
//! - `DNA_LOG_MODE`: `stdout` or `file` (default `stdout`)
//! - `DNA_LOG_FILE`: log path when logging to a file (default `logs/dna-predictor.log`)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::domain::CohortConfig;
use crate::DnaError;

const DEFAULT_MODEL_DIR: &str = "model";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_LOG_FILE: &str = "logs/dna-predictor.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Stdout,
    File,
}

/// Logging destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub mode: LogMode,
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            mode: LogMode::Stdout,
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl LogConfig {
    /// Load overrides from the process environment (best-effort).
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through `lookup`; unknown values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup("DNA_LOG_MODE") {
            match v.trim() {
                "file" => cfg.mode = LogMode::File,
                "stdout" => cfg.mode = LogMode::Stdout,
                other => eprintln!("Ignoring unknown DNA_LOG_MODE {other:?}"),
            }
        }
        if let Some(v) = lookup("DNA_LOG_FILE") {
            if !v.trim().is_empty() {
                cfg.file = PathBuf::from(v.trim());
            }
        }

        cfg
    }
}

/// Configuration of the scoring server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub model_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

impl ServeConfig {
    /// Load overrides from the process environment (best-effort).
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through `lookup`; invalid values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup("DNA_MODEL_DIR") {
            if !v.trim().is_empty() {
                cfg.model_dir = PathBuf::from(v.trim());
            }
        }

        if let Some(v) = lookup("DNA_BIND_ADDR") {
            match v.trim().parse::<SocketAddr>() {
                Ok(addr) => cfg.bind_addr = addr,
                Err(e) => tracing::warn!(
                    "Invalid DNA_BIND_ADDR {:?} ({}), using {}",
                    v,
                    e,
                    DEFAULT_BIND_ADDR
                ),
            }
        }

        cfg
    }
}

/// Read a cohort configuration from a JSON file and validate it.
///
/// Omitted fields take their default values.
///
/// # Errors
/// Returns error if the file cannot be read or parsed, or the parameters
/// are inconsistent.
pub fn load_cohort_config(path: &Path) -> crate::Result<CohortConfig> {
    let content = std::fs::read(path)?;
    let config: CohortConfig = serde_json::from_slice(&content)?;
    config
        .validate()
        .map_err(|e| DnaError::InvalidConfig(format!("{}: {e}", path.display())))?;
    Ok(config)
}
