//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{
    DEFAULT_PERSIST_ATTEMPTS, MAX_PERSIST_ATTEMPTS, PATIENTS_JSON_FILENAME, RECORDS_DIR_NAME,
};
use crate::{PlannerError, PlannerResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    persist_attempts: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Configuration` if `persist_attempts` is zero or larger than
    /// [`MAX_PERSIST_ATTEMPTS`].
    pub fn new(patient_data_dir: PathBuf, persist_attempts: u32) -> PlannerResult<Self> {
        if persist_attempts == 0 || persist_attempts > MAX_PERSIST_ATTEMPTS {
            return Err(PlannerError::Configuration(format!(
                "persist_attempts must be between 1 and {MAX_PERSIST_ATTEMPTS}, got {persist_attempts}"
            )));
        }

        Ok(Self {
            patient_data_dir,
            persist_attempts,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn records_dir(&self) -> PathBuf {
        self.patient_data_dir.join(RECORDS_DIR_NAME)
    }

    /// Full path of the JSON snapshot holding every patient record.
    pub fn patients_file(&self) -> PathBuf {
        self.records_dir().join(PATIENTS_JSON_FILENAME)
    }

    pub fn persist_attempts(&self) -> u32 {
        self.persist_attempts
    }
}

/// Parse the number of snapshot write attempts from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PERSIST_ATTEMPTS`]. Range checks
/// happen in [`CoreConfig::new`].
pub fn persist_attempts_from_env_value(value: Option<String>) -> PlannerResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_PERSIST_ATTEMPTS),
        Some(v) => v.parse::<u32>().map_err(|_| {
            PlannerError::Configuration(format!(
                "PREOP_PERSIST_ATTEMPTS must be a positive integer, got '{v}'"
            ))
        }),
    }
}
