//! Application session.
//!
//! A [`Session`] owns the ordered list of patient records for the lifetime of a process and is
//! the only place that list is mutated. Front ends hold the session and pass it by reference;
//! there is no process-wide state.
//!
//! The list is append-only. After every append the full list is written to the
//! [`PatientStore`]; if that write fails the append is undone, so a submission is only reported
//! as successful once it is durable.

use crate::config::CoreConfig;
use crate::procedure::{self, Advisory, ProcedureName};
use crate::store::PatientStore;
use crate::validation::{PatientRecord, RawReading, ValidationEngine};
use crate::PlannerResult;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug)]
pub struct Session {
    engine: ValidationEngine,
    store: PatientStore,
    records: Vec<PatientRecord>,
}

impl Session {
    /// Opens a session with the standard range table, loading any persisted records.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if an existing snapshot cannot be read or parsed.
    pub fn open(cfg: Arc<CoreConfig>) -> PlannerResult<Self> {
        Self::with_engine(cfg, ValidationEngine::default())
    }

    /// Opens a session with a specific validation engine.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if an existing snapshot cannot be read or parsed.
    pub fn with_engine(cfg: Arc<CoreConfig>, engine: ValidationEngine) -> PlannerResult<Self> {
        let store = PatientStore::new(&cfg);
        let records = store.load()?;
        tracing::info!(
            "session opened with {} patient records from {}",
            records.len(),
            cfg.patient_data_dir().display()
        );

        Ok(Self {
            engine,
            store,
            records,
        })
    }

    /// Validates a patient form, appends the record and persists the full list.
    ///
    /// Abnormal findings do not block the submission; they are returned on the record.
    ///
    /// # Errors
    ///
    /// - `PlannerError::Asa` if the ASA field is invalid; nothing is appended.
    /// - a persistence error if the snapshot cannot be written; the append is undone.
    pub fn submit_patient(&mut self, raw: &RawReading) -> PlannerResult<PatientRecord> {
        let record = self.engine.validate(raw)?;

        if record.has_findings() {
            tracing::warn!(
                "patient {} recorded with {} abnormal findings",
                record.id.simple(),
                record.findings.len()
            );
        }

        self.records.push(record.clone());
        if let Err(e) = self.store.save(&self.records) {
            self.records.pop();
            return Err(e);
        }

        tracing::info!("patient {} recorded (ASA {})", record.id.simple(), record.asa);
        Ok(record)
    }

    /// Assesses a procedure against the most recently recorded patient.
    ///
    /// # Errors
    ///
    /// - `PlannerError::InvalidInput` if the procedure name is empty.
    /// - `PlannerError::MissingPatient` if no patient has been recorded yet.
    pub fn submit_procedure(&self, procedure_name: &str) -> PlannerResult<Advisory> {
        let procedure = ProcedureName::new(procedure_name)?;
        let advisory = procedure::advise(self.latest(), procedure)?;
        tracing::info!("procedure {} assessed: {:?}", advisory.procedure, advisory.level);
        Ok(advisory)
    }

    /// Every record, in append order.
    pub fn patients(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&PatientRecord> {
        self.records.last()
    }

    pub fn find(&self, id: &Uuid) -> Option<&PatientRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Records whose name contains `query`, ignoring case. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&PatientRecord> {
        let needle = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| needle.is_empty() || r.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::AdvisoryLevel;
    use crate::{AsaError, PlannerError};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_cfg(patient_data_dir: &Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(patient_data_dir.to_path_buf(), 1)
                .expect("CoreConfig::new should succeed"),
        )
    }

    fn reading(name: &str, asa: &str) -> RawReading {
        RawReading {
            name: name.into(),
            age: "61".into(),
            weight: "70".into(),
            height: "170".into(),
            bp_systolic: "120".into(),
            bp_diastolic: "80".into(),
            hr: "75".into(),
            rr: "16".into(),
            temp: "37.0".into(),
            spo2: "98".into(),
            asa: asa.into(),
        }
    }

    #[test]
    fn test_open_starts_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let session = Session::open(test_cfg(temp_dir.path())).expect("open should succeed");

        assert!(session.patients().is_empty());
        assert!(session.latest().is_none());
    }

    #[test]
    fn test_submit_patient_appends_and_persists() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());
        let mut session = Session::open(cfg.clone()).expect("open should succeed");

        let record = session
            .submit_patient(&reading("Alice", "2"))
            .expect("submit should succeed");

        assert_eq!(session.patients().len(), 1);
        assert_eq!(session.latest(), Some(&record));
        assert!(cfg.patients_file().is_file(), "snapshot should be written");
    }

    #[test]
    fn test_invalid_asa_appends_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());
        let mut session = Session::open(cfg.clone()).expect("open should succeed");

        for asa in ["0", "6", "abc", ""] {
            let err = session
                .submit_patient(&reading("Nobody", asa))
                .expect_err("invalid ASA should be rejected");
            assert!(matches!(err, PlannerError::Asa(_)), "ASA {asa:?}: {err:?}");
        }

        assert!(session.patients().is_empty());
        assert!(!cfg.patients_file().exists(), "nothing should be persisted");
    }

    #[test]
    fn test_abnormal_reading_is_still_recorded() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = Session::open(test_cfg(temp_dir.path())).expect("open should succeed");

        let raw = RawReading {
            weight: "250".into(),
            ..reading("Heavy", "3")
        };
        let record = session.submit_patient(&raw).expect("submit should succeed");

        assert_eq!(record.findings.len(), 1);
        assert!(record.findings[0].message.contains("Weight"));
        assert!(record.findings[0].message.contains("outside normal range"));
        assert_eq!(session.patients()[0].vitals.weight, Some(250.0));
    }

    #[test]
    fn test_reopen_reproduces_all_records() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        let mut session = Session::open(cfg.clone()).expect("open should succeed");
        for (name, asa) in [("Alice", "1"), ("Bob", "3"), ("Carol", "5")] {
            let raw = RawReading {
                hr: if name == "Bob" { "abc".into() } else { "75".into() },
                ..reading(name, asa)
            };
            session.submit_patient(&raw).expect("submit should succeed");
        }
        let before = session.patients().to_vec();
        drop(session);

        let reopened = Session::open(cfg).expect("reopen should succeed");
        assert_eq!(reopened.patients(), before.as_slice());
        assert_eq!(reopened.patients()[1].vitals.heart_rate, None);
        assert_eq!(
            reopened.patients()[1].findings[0].message,
            "Heart Rate must be a number."
        );
    }

    #[test]
    fn test_reopen_keeps_full_precision_readings() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        let mut session = Session::open(cfg.clone()).expect("open should succeed");
        let raw = RawReading {
            weight: "109.65412805471429".into(),
            temp: "36.849999999999994".into(),
            hr: "1e2".into(),
            bp_diastolic: "-0.5".into(),
            ..reading("Precise", "3")
        };
        let record = session.submit_patient(&raw).expect("submit should succeed");
        drop(session);

        let reopened = Session::open(cfg).expect("reopen should succeed");
        let restored = &reopened.patients()[0];
        assert_eq!(restored, &record);
        assert_eq!(restored.vitals.weight, Some(109.65412805471429));
        assert_eq!(restored.vitals.temperature, Some(36.849999999999994));
        assert_eq!(restored.vitals.heart_rate, Some(100.0));
        assert_eq!(restored.vitals.bp_diastolic, Some(-0.5));
    }

    #[test]
    fn test_failed_persistence_undoes_append() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());
        let mut session = Session::open(cfg.clone()).expect("open should succeed");

        fs::write(cfg.records_dir(), "blocker").expect("should write blocker");

        let err = session
            .submit_patient(&reading("Alice", "2"))
            .expect_err("persistence should fail");
        assert!(err.is_persistence(), "{err:?}");
        assert!(session.patients().is_empty(), "append should be undone");
    }

    #[test]
    fn test_procedure_requires_a_patient() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let session = Session::open(test_cfg(temp_dir.path())).expect("open should succeed");

        let err = session
            .submit_procedure("Appendectomy")
            .expect_err("no patient yet");
        assert!(matches!(err, PlannerError::MissingPatient));
    }

    #[test]
    fn test_procedure_uses_latest_patient() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = Session::open(test_cfg(temp_dir.path())).expect("open should succeed");

        session
            .submit_patient(&reading("Alice", "1"))
            .expect("submit should succeed");
        let advisory = session
            .submit_procedure("Knee arthroscopy")
            .expect("advisory");
        assert_eq!(advisory.level, AdvisoryLevel::StandardProtocol);

        session
            .submit_patient(&reading("Bob", "4"))
            .expect("submit should succeed");
        let advisory = session
            .submit_procedure("Knee arthroscopy")
            .expect("advisory");
        assert_eq!(advisory.level, AdvisoryLevel::ElevatedRisk);
        assert!(advisory.message.contains("Knee arthroscopy"));
    }

    #[test]
    fn test_search_and_find() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = Session::open(test_cfg(temp_dir.path())).expect("open should succeed");

        let alice = session
            .submit_patient(&reading("Alice Smith", "1"))
            .expect("submit should succeed");
        session
            .submit_patient(&reading("Bob Jones", "2"))
            .expect("submit should succeed");

        let hits = session.search("SMITH");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Alice Smith");
        assert_eq!(session.search("  ").len(), 2);
        assert!(session.search("nobody").is_empty());

        assert_eq!(session.find(&alice.id), Some(&alice));
        assert!(session.find(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_asa_error_message_reaches_caller() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = Session::open(test_cfg(temp_dir.path())).expect("open should succeed");

        let err = session
            .submit_patient(&reading("Alice", "7"))
            .expect_err("out of range");
        assert!(matches!(err, PlannerError::Asa(AsaError::OutOfRange(7))));
        assert_eq!(err.to_string(), "ASA classification must be between 1 and 5.");
    }
}
