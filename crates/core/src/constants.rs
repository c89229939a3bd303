//! Constants used throughout the Preop core crate.
//!
//! This module contains path, filename and clinical threshold constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name for the persisted patient records.
pub const RECORDS_DIR_NAME: &str = "records";

/// Filename for the patient records snapshot.
pub const PATIENTS_JSON_FILENAME: &str = "patients.json";

/// Default number of attempts made when writing the patient snapshot.
pub const DEFAULT_PERSIST_ATTEMPTS: u32 = 3;

/// Upper bound for the configurable number of snapshot write attempts.
pub const MAX_PERSIST_ATTEMPTS: u32 = 10;

/// Lowest valid ASA physical-status class.
pub const ASA_MIN: i64 = 1;

/// Highest valid ASA physical-status class.
pub const ASA_MAX: i64 = 5;

/// ASA classes strictly above this value trigger the elevated-risk procedure advisory.
pub const ELEVATED_RISK_ASA_THRESHOLD: u8 = 2;
