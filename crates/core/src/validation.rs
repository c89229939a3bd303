//! Vital-sign validation.
//!
//! This module turns raw text input into a [`PatientRecord`]:
//! - the ASA class is a hard gate; an invalid class stops the submission before anything else
//!   is looked at,
//! - every vital sign is then parsed and range-checked, and problems are collected as
//!   [`AbnormalityFinding`]s rather than returned as errors,
//! - abnormal values are still stored on the record.

use crate::asa::{AsaClass, AsaError};
use crate::vitals::{RangeTable, VitalSignKind, Vitals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Input
// ============================================================================

/// Unparsed patient form as supplied by a front end.
///
/// Every value is text. Missing fields default to the empty string, which fails to parse like
/// any other non-numeric input. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawReading {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub height: String,
    pub bp_systolic: String,
    pub bp_diastolic: String,
    pub hr: String,
    pub rr: String,
    pub temp: String,
    pub spo2: String,
    pub asa: String,
}

impl RawReading {
    /// Raw text of the field holding `kind`.
    pub fn field(&self, kind: VitalSignKind) -> &str {
        match kind {
            VitalSignKind::Weight => &self.weight,
            VitalSignKind::Height => &self.height,
            VitalSignKind::BpSystolic => &self.bp_systolic,
            VitalSignKind::BpDiastolic => &self.bp_diastolic,
            VitalSignKind::HeartRate => &self.hr,
            VitalSignKind::RespiratoryRate => &self.rr,
            VitalSignKind::Temperature => &self.temp,
            VitalSignKind::Spo2 => &self.spo2,
        }
    }
}

// ============================================================================
// Findings
// ============================================================================

/// The field a finding refers to. Blood pressure parse failures are reported once for both
/// halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingField {
    Vital(VitalSignKind),
    BloodPressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// The text was not a number.
    Unparsable,
    /// The number lies outside its normal range.
    OutOfRange,
}

/// One human-readable abnormality flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbnormalityFinding {
    pub field: FindingField,
    pub kind: FindingKind,
    pub message: String,
}

impl AbnormalityFinding {
    fn unparsable(kind: VitalSignKind) -> Self {
        Self {
            field: FindingField::Vital(kind),
            kind: FindingKind::Unparsable,
            message: format!("{} must be a number.", kind.label()),
        }
    }

    fn blood_pressure_unparsable() -> Self {
        Self {
            field: FindingField::BloodPressure,
            kind: FindingKind::Unparsable,
            message: "Blood Pressure must be numeric values.".to_string(),
        }
    }

    fn out_of_range(kind: VitalSignKind, value: f64) -> Self {
        Self {
            field: FindingField::Vital(kind),
            kind: FindingKind::OutOfRange,
            message: format!(
                "{} {} {} is outside normal range.",
                kind.label(),
                format_value(value),
                kind.unit()
            ),
        }
    }
}

impl std::fmt::Display for AbnormalityFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================================
// Record
// ============================================================================

/// A validated patient submission.
///
/// `name` and `age` are carried exactly as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    pub id: Uuid,
    pub name: String,
    pub age: String,
    pub vitals: Vitals,
    pub asa: AsaClass,
    pub findings: Vec<AbnormalityFinding>,
    pub recorded_at: DateTime<Utc>,
}

impl PatientRecord {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// One step of the field checks. Blood pressure is checked as a pair.
#[derive(Clone, Copy)]
enum FieldCheck {
    Single(VitalSignKind),
    BloodPressure,
}

const CHECK_ORDER: [FieldCheck; 7] = [
    FieldCheck::Single(VitalSignKind::Weight),
    FieldCheck::Single(VitalSignKind::Height),
    FieldCheck::BloodPressure,
    FieldCheck::Single(VitalSignKind::HeartRate),
    FieldCheck::Single(VitalSignKind::RespiratoryRate),
    FieldCheck::Single(VitalSignKind::Temperature),
    FieldCheck::Single(VitalSignKind::Spo2),
];

/// Parses and range-checks raw readings against a [`RangeTable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine {
    ranges: RangeTable,
}

impl ValidationEngine {
    pub fn new(ranges: RangeTable) -> Self {
        Self { ranges }
    }

    /// Validates one submission.
    ///
    /// All vital signs are always checked, in declaration order, and every problem is reported
    /// in the returned record's findings. Findings never cause this function to fail.
    ///
    /// # Errors
    ///
    /// Returns [`AsaError`] if the ASA field is not an integer in 1 to 5. No vital sign is
    /// examined in that case.
    pub fn validate(&self, raw: &RawReading) -> Result<PatientRecord, AsaError> {
        let asa = AsaClass::parse(&raw.asa)?;

        let mut vitals = Vitals::default();
        let findings = CHECK_ORDER
            .iter()
            .flat_map(|check| self.run_check(*check, raw, &mut vitals))
            .collect();

        Ok(PatientRecord {
            id: Uuid::new_v4(),
            name: raw.name.clone(),
            age: raw.age.clone(),
            vitals,
            asa,
            findings,
            recorded_at: Utc::now(),
        })
    }

    fn run_check(
        &self,
        check: FieldCheck,
        raw: &RawReading,
        vitals: &mut Vitals,
    ) -> Vec<AbnormalityFinding> {
        match check {
            FieldCheck::Single(kind) => match parse_number(raw.field(kind)) {
                Some(value) => {
                    vitals.set(kind, Some(value));
                    self.range_finding(kind, value).into_iter().collect()
                }
                None => vec![AbnormalityFinding::unparsable(kind)],
            },
            FieldCheck::BloodPressure => {
                let systolic = parse_number(raw.field(VitalSignKind::BpSystolic));
                let diastolic = parse_number(raw.field(VitalSignKind::BpDiastolic));

                match (systolic, diastolic) {
                    (Some(systolic), Some(diastolic)) => {
                        vitals.set(VitalSignKind::BpSystolic, Some(systolic));
                        vitals.set(VitalSignKind::BpDiastolic, Some(diastolic));
                        self.range_finding(VitalSignKind::BpSystolic, systolic)
                            .into_iter()
                            .chain(self.range_finding(VitalSignKind::BpDiastolic, diastolic))
                            .collect()
                    }
                    _ => vec![AbnormalityFinding::blood_pressure_unparsable()],
                }
            }
        }
    }

    fn range_finding(&self, kind: VitalSignKind, value: f64) -> Option<AbnormalityFinding> {
        if self.ranges.range_for(kind).contains(value) {
            None
        } else {
            Some(AbnormalityFinding::out_of_range(kind, value))
        }
    }
}

/// Parses a decimal number, ignoring surrounding whitespace. Non-finite values are rejected.
fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Renders a value the way the findings have always shown it: whole numbers keep one decimal
/// place (`250.0`), other values use the shortest exact form (`37.8`). Magnitudes from `1e16` up
/// or below `1e-4` switch to exponent form with a signed, two-digit exponent (`1e+16`, `1.5e-05`).
fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => match exponent.parse::<i32>() {
                Ok(exp) => {
                    let sign = if exp < 0 { '-' } else { '+' };
                    format!("{mantissa}e{sign}{:02}", exp.abs())
                }
                Err(_) => formatted,
            },
            None => formatted,
        };
    }

    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
