//! JSON snapshot persistence for patient records.
//!
//! The whole patient list is written as one JSON array to
//! `<patient_data_dir>/records/patients.json`. Every save replaces the file in full: the
//! snapshot is written to a temporary sibling, flushed, and renamed over the previous one, so a
//! reader never observes a half-written file.
//!
//! ```text
//! patient_data/
//!   records/
//!     patients.json
//! ```

use crate::config::CoreConfig;
use crate::validation::PatientRecord;
use crate::{PlannerError, PlannerResult};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-backed store for the full patient list.
#[derive(Debug, Clone)]
pub struct PatientStore {
    path: PathBuf,
    attempts: u32,
}

impl PatientStore {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            path: cfg.patients_file(),
            attempts: cfg.persist_attempts(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every persisted record, in append order.
    ///
    /// A missing snapshot file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileRead` if the file exists but cannot be read, and
    /// `PlannerError::Deserialization` (naming the failing JSON path) if it does not hold a
    /// valid patient list.
    pub fn load(&self) -> PlannerResult<Vec<PatientRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no patient snapshot at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(PlannerError::FileRead(e)),
        };

        let records = parse_snapshot(&contents)?;
        tracing::debug!(
            "loaded {} patient records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Replaces the snapshot with `records`.
    ///
    /// Write failures are retried up to the configured number of attempts.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt if every attempt fails.
    pub fn save(&self, records: &[PatientRecord]) -> PlannerResult<()> {
        let serialized = serde_json::to_vec_pretty(records).map_err(PlannerError::Serialization)?;

        let mut attempt = 1;
        loop {
            match self.write_snapshot(&serialized) {
                Ok(()) => {
                    tracing::info!(
                        "saved {} patient records to {}",
                        records.len(),
                        self.path.display()
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.attempts => {
                    tracing::warn!(
                        "patient snapshot write attempt {}/{} failed: {}",
                        attempt,
                        self.attempts,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "giving up on patient snapshot after {} attempts: {}",
                        attempt,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    fn write_snapshot(&self, bytes: &[u8]) -> PlannerResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(PlannerError::StorageDirCreation)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(PlannerError::FileWrite)?;
        file.write_all(bytes).map_err(PlannerError::FileWrite)?;
        file.sync_all().map_err(PlannerError::FileWrite)?;

        fs::rename(&temp_path, &self.path).map_err(PlannerError::FileWrite)
    }
}

/// Parses snapshot text, reporting the JSON path of the first mismatch.
fn parse_snapshot(json_text: &str) -> PlannerResult<Vec<PatientRecord>> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);

    serde_path_to_error::deserialize::<_, Vec<PatientRecord>>(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        PlannerError::Deserialization(format!("patient snapshot mismatch at {path}: {source}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{RawReading, ValidationEngine};
    use tempfile::TempDir;

    fn test_cfg(dir: &Path) -> CoreConfig {
        CoreConfig::new(dir.to_path_buf(), 2).expect("CoreConfig::new should succeed")
    }

    fn record(name: &str, weight: &str, asa: &str) -> PatientRecord {
        ValidationEngine::default()
            .validate(&RawReading {
                name: name.into(),
                age: "50".into(),
                weight: weight.into(),
                height: "170".into(),
                bp_systolic: "120".into(),
                bp_diastolic: "80".into(),
                hr: "abc".into(),
                rr: "16".into(),
                temp: "37.0".into(),
                spo2: "98".into(),
                asa: asa.into(),
            })
            .expect("valid ASA")
    }

    #[test]
    fn test_load_returns_empty_when_no_snapshot() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PatientStore::new(&test_cfg(temp_dir.path()));

        let records = store.load().expect("load should succeed");
        assert!(records.is_empty());
    }

    #[test]
    fn test_save_then_load_reproduces_records() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PatientStore::new(&test_cfg(temp_dir.path()));

        let records = vec![
            record("Alice", "70", "1"),
            record("Bob", "250", "3"),
            record("Carol", "heavy", "5"),
        ];
        store.save(&records).expect("save should succeed");

        assert!(store.path().is_file(), "snapshot should exist");
        assert!(
            !store.path().with_extension("json.tmp").exists(),
            "temporary file should be renamed away"
        );

        let loaded = store.load().expect("load should succeed");
        assert_eq!(loaded, records);
        assert_eq!(loaded[1].vitals.weight, Some(250.0));
        assert_eq!(loaded[2].vitals.weight, None);
        assert_eq!(loaded[0].vitals.heart_rate, None);
    }

    #[test]
    fn test_full_precision_values_survive_reload() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PatientStore::new(&test_cfg(temp_dir.path()));

        let weights = [
            "109.65412805471429",
            "96.83292448671429",
            "45.187540913999996",
            "1e2",
            "-3.25",
            "0.1",
        ];
        let records: Vec<PatientRecord> = weights
            .iter()
            .map(|weight| record("Precise", weight, "2"))
            .collect();
        store.save(&records).expect("save should succeed");

        let loaded = store.load().expect("load should succeed");
        for (weight, loaded) in weights.iter().zip(&loaded) {
            let expected: f64 = weight.parse().expect("valid float");
            assert_eq!(loaded.vitals.weight, Some(expected), "weight {weight}");
        }
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PatientStore::new(&test_cfg(temp_dir.path()));

        store
            .save(&[record("First", "70", "2")])
            .expect("first save should succeed");
        let second = vec![record("First", "70", "2"), record("Second", "80", "4")];
        store.save(&second).expect("second save should succeed");

        assert_eq!(store.load().expect("load should succeed").len(), 2);
    }

    #[test]
    fn test_load_reports_path_of_invalid_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());
        let store = PatientStore::new(&cfg);

        store
            .save(&[record("Alice", "70", "2")])
            .expect("save should succeed");
        let text = fs::read_to_string(store.path()).expect("should read snapshot");
        let corrupted = text.replace("\"asa\": 2", "\"asa\": 9");
        fs::write(store.path(), corrupted).expect("should write snapshot");

        let err = store.load().expect_err("ASA 9 is invalid");
        match err {
            PlannerError::Deserialization(msg) => assert!(msg.contains("asa"), "{msg}"),
            other => panic!("expected Deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());
        fs::create_dir_all(cfg.records_dir()).expect("should create records dir");
        fs::write(cfg.patients_file(), "not json").expect("should write file");

        let err = PatientStore::new(&cfg).load().expect_err("invalid JSON");
        assert!(err.is_persistence());
    }

    #[test]
    fn test_save_fails_when_records_path_is_blocked() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());
        // A plain file where the records directory should be makes every attempt fail.
        fs::write(cfg.records_dir(), "blocker").expect("should write blocker");

        let err = PatientStore::new(&cfg)
            .save(&[record("Alice", "70", "2")])
            .expect_err("save should fail");
        assert!(matches!(err, PlannerError::StorageDirCreation(_)));
    }
}
