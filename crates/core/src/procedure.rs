//! Procedure submissions and the procedure-risk advisory.
//!
//! A procedure is always assessed against the most recently recorded patient. Submitting a
//! procedure before any patient exists is rejected outright.

use crate::constants::ELEVATED_RISK_ASA_THRESHOLD;
use crate::risk::Classification;
use crate::validation::PatientRecord;
use crate::{PlannerError, PlannerResult};
use serde::Serialize;

/// Name of a planned procedure. Trimmed, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureName(String);

impl ProcedureName {
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidInput` if the trimmed name is empty.
    pub fn new(input: impl AsRef<str>) -> PlannerResult<Self> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlannerError::InvalidInput(
                "procedure name cannot be empty".into(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProcedureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryLevel {
    ElevatedRisk,
    StandardProtocol,
}

/// Outcome of a procedure submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub procedure: ProcedureName,
    pub level: AdvisoryLevel,
    pub classification: Classification,
    pub message: String,
}

/// Builds the advisory for `procedure` from the latest patient record.
///
/// # Errors
///
/// Returns `PlannerError::MissingPatient` if `latest` is `None`.
pub fn advise(latest: Option<&PatientRecord>, procedure: ProcedureName) -> PlannerResult<Advisory> {
    let record = latest.ok_or(PlannerError::MissingPatient)?;
    let asa = record.asa;

    let (level, message) = if asa.value() > ELEVATED_RISK_ASA_THRESHOLD {
        (
            AdvisoryLevel::ElevatedRisk,
            format!(
                "Elevated risk for {procedure}: patient is ASA {asa}. Review the anesthetic plan before proceeding."
            ),
        )
    } else {
        (
            AdvisoryLevel::StandardProtocol,
            format!("Standard protocol for {procedure}: patient is ASA {asa}."),
        )
    };

    Ok(Advisory {
        procedure,
        level,
        classification: asa.classification(),
        message,
    })
}
