//! Vital signs and their clinically normal reference ranges.
//!
//! The set of vital signs is closed: [`VitalSignKind::ALL`] lists every kind in declaration
//! order, which is also the order findings are reported in.

use crate::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// Vital sign kinds
// ============================================================================

/// Identifier of a single vital sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSignKind {
    Weight,
    Height,
    BpSystolic,
    BpDiastolic,
    HeartRate,
    RespiratoryRate,
    Temperature,
    Spo2,
}

impl VitalSignKind {
    /// Every kind, in declaration order.
    pub const ALL: [VitalSignKind; 8] = [
        VitalSignKind::Weight,
        VitalSignKind::Height,
        VitalSignKind::BpSystolic,
        VitalSignKind::BpDiastolic,
        VitalSignKind::HeartRate,
        VitalSignKind::RespiratoryRate,
        VitalSignKind::Temperature,
        VitalSignKind::Spo2,
    ];

    fn index(self) -> usize {
        match self {
            VitalSignKind::Weight => 0,
            VitalSignKind::Height => 1,
            VitalSignKind::BpSystolic => 2,
            VitalSignKind::BpDiastolic => 3,
            VitalSignKind::HeartRate => 4,
            VitalSignKind::RespiratoryRate => 5,
            VitalSignKind::Temperature => 6,
            VitalSignKind::Spo2 => 7,
        }
    }

    /// Stable snake_case identifier, as used in persisted findings.
    pub fn id(self) -> &'static str {
        match self {
            VitalSignKind::Weight => "weight",
            VitalSignKind::Height => "height",
            VitalSignKind::BpSystolic => "bp_systolic",
            VitalSignKind::BpDiastolic => "bp_diastolic",
            VitalSignKind::HeartRate => "heart_rate",
            VitalSignKind::RespiratoryRate => "respiratory_rate",
            VitalSignKind::Temperature => "temperature",
            VitalSignKind::Spo2 => "spo2",
        }
    }

    /// Human-readable label used in findings.
    pub fn label(self) -> &'static str {
        match self {
            VitalSignKind::Weight => "Weight",
            VitalSignKind::Height => "Height",
            VitalSignKind::BpSystolic => "Systolic Blood Pressure",
            VitalSignKind::BpDiastolic => "Diastolic Blood Pressure",
            VitalSignKind::HeartRate => "Heart Rate",
            VitalSignKind::RespiratoryRate => "Respiratory Rate",
            VitalSignKind::Temperature => "Temperature",
            VitalSignKind::Spo2 => "Oxygen Saturation",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            VitalSignKind::Weight => "kg",
            VitalSignKind::Height => "cm",
            VitalSignKind::BpSystolic | VitalSignKind::BpDiastolic => "mmHg",
            VitalSignKind::HeartRate => "bpm",
            VitalSignKind::RespiratoryRate => "breaths/min",
            VitalSignKind::Temperature => "°C",
            VitalSignKind::Spo2 => "%",
        }
    }
}

impl std::fmt::Display for VitalSignKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// Normal ranges
// ============================================================================

/// Closed interval `[min, max]` considered clinically unremarkable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalRange {
    min: f64,
    max: f64,
}

impl NormalRange {
    /// Creates a range, enforcing `min < max`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Configuration` if the bounds are not finite or `min >= max`.
    pub fn new(min: f64, max: f64) -> PlannerResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(PlannerError::Configuration(format!(
                "normal range bounds must be finite with min < max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    // Only for the constant table below, whose bounds are known to be ordered.
    const fn fixed(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Inclusive containment check.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

// ============================================================================
// Range table
// ============================================================================

/// Immutable mapping from every [`VitalSignKind`] to its [`NormalRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeTable {
    ranges: [NormalRange; 8],
}

const STANDARD_RANGES: [NormalRange; 8] = [
    NormalRange::fixed(30.0, 200.0),
    NormalRange::fixed(100.0, 220.0),
    NormalRange::fixed(90.0, 140.0),
    NormalRange::fixed(60.0, 90.0),
    NormalRange::fixed(60.0, 100.0),
    NormalRange::fixed(12.0, 20.0),
    NormalRange::fixed(36.5, 37.5),
    NormalRange::fixed(95.0, 100.0),
];

impl RangeTable {
    /// The adult reference ranges used for pre-anaesthetic screening.
    pub const fn standard() -> Self {
        Self {
            ranges: STANDARD_RANGES,
        }
    }

    /// Builds a table from explicit entries.
    ///
    /// Every kind must appear exactly once.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Configuration` if a kind is missing or repeated.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (VitalSignKind, NormalRange)>,
    ) -> PlannerResult<Self> {
        let mut slots: [Option<NormalRange>; 8] = [None; 8];

        for (kind, range) in entries {
            let slot = &mut slots[kind.index()];
            if slot.is_some() {
                return Err(PlannerError::Configuration(format!(
                    "duplicate normal range for {kind}"
                )));
            }
            *slot = Some(range);
        }

        let mut ranges = STANDARD_RANGES;
        for kind in VitalSignKind::ALL {
            ranges[kind.index()] = slots[kind.index()].ok_or_else(|| {
                PlannerError::Configuration(format!("missing normal range for {kind}"))
            })?;
        }

        Ok(Self { ranges })
    }

    pub fn range_for(&self, kind: VitalSignKind) -> NormalRange {
        self.ranges[kind.index()]
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Parsed readings
// ============================================================================

/// Numeric vital signs of one record. `None` marks a value that could not be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub bp_systolic: Option<f64>,
    pub bp_diastolic: Option<f64>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub spo2: Option<f64>,
}

impl Vitals {
    pub fn get(&self, kind: VitalSignKind) -> Option<f64> {
        match kind {
            VitalSignKind::Weight => self.weight,
            VitalSignKind::Height => self.height,
            VitalSignKind::BpSystolic => self.bp_systolic,
            VitalSignKind::BpDiastolic => self.bp_diastolic,
            VitalSignKind::HeartRate => self.heart_rate,
            VitalSignKind::RespiratoryRate => self.respiratory_rate,
            VitalSignKind::Temperature => self.temperature,
            VitalSignKind::Spo2 => self.spo2,
        }
    }

    pub fn set(&mut self, kind: VitalSignKind, value: Option<f64>) {
        let slot = match kind {
            VitalSignKind::Weight => &mut self.weight,
            VitalSignKind::Height => &mut self.height,
            VitalSignKind::BpSystolic => &mut self.bp_systolic,
            VitalSignKind::BpDiastolic => &mut self.bp_diastolic,
            VitalSignKind::HeartRate => &mut self.heart_rate,
            VitalSignKind::RespiratoryRate => &mut self.respiratory_rate,
            VitalSignKind::Temperature => &mut self.temperature,
            VitalSignKind::Spo2 => &mut self.spo2,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_matches_reference_ranges() {
        let table = RangeTable::standard();
        let expected = [
            (VitalSignKind::Weight, 30.0, 200.0),
            (VitalSignKind::Height, 100.0, 220.0),
            (VitalSignKind::BpSystolic, 90.0, 140.0),
            (VitalSignKind::BpDiastolic, 60.0, 90.0),
            (VitalSignKind::HeartRate, 60.0, 100.0),
            (VitalSignKind::RespiratoryRate, 12.0, 20.0),
            (VitalSignKind::Temperature, 36.5, 37.5),
            (VitalSignKind::Spo2, 95.0, 100.0),
        ];
        for (kind, min, max) in expected {
            let range = table.range_for(kind);
            assert_eq!(range.min(), min, "{kind} min");
            assert_eq!(range.max(), max, "{kind} max");
        }
    }

    #[test]
    fn ranges_are_inclusive() {
        let range = RangeTable::standard().range_for(VitalSignKind::Temperature);
        assert!(range.contains(36.5));
        assert!(range.contains(37.5));
        assert!(!range.contains(36.4));
        assert!(!range.contains(37.6));
    }

    #[test]
    fn normal_range_rejects_inverted_bounds() {
        assert!(NormalRange::new(10.0, 5.0).is_err());
        assert!(NormalRange::new(5.0, 5.0).is_err());
        assert!(NormalRange::new(f64::NAN, 5.0).is_err());
        assert!(NormalRange::new(1.0, 5.0).is_ok());
    }

    #[test]
    fn from_entries_requires_every_kind() {
        let entries = VitalSignKind::ALL
            .into_iter()
            .filter(|k| *k != VitalSignKind::Spo2)
            .map(|k| (k, NormalRange::new(0.0, 1.0).unwrap()));

        let err = RangeTable::from_entries(entries).expect_err("spo2 missing");
        match err {
            PlannerError::Configuration(msg) => assert!(msg.contains("spo2")),
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn from_entries_rejects_duplicates() {
        let mut entries: Vec<_> = VitalSignKind::ALL
            .into_iter()
            .map(|k| (k, NormalRange::new(0.0, 1.0).unwrap()))
            .collect();
        entries.push((VitalSignKind::Weight, NormalRange::new(1.0, 2.0).unwrap()));

        assert!(RangeTable::from_entries(entries).is_err());
    }

    #[test]
    fn from_entries_builds_custom_table() {
        let table = RangeTable::from_entries(VitalSignKind::ALL.into_iter().map(|k| {
            let range = if k == VitalSignKind::HeartRate {
                NormalRange::new(50.0, 110.0).unwrap()
            } else {
                RangeTable::standard().range_for(k)
            };
            (k, range)
        }))
        .expect("complete table");

        assert_eq!(table.range_for(VitalSignKind::HeartRate).min(), 50.0);
        assert_eq!(table.range_for(VitalSignKind::Weight).max(), 200.0);
    }

    #[test]
    fn vitals_get_and_set_address_the_same_field() {
        let mut vitals = Vitals::default();
        for (i, kind) in VitalSignKind::ALL.into_iter().enumerate() {
            vitals.set(kind, Some(i as f64));
        }
        for (i, kind) in VitalSignKind::ALL.into_iter().enumerate() {
            assert_eq!(vitals.get(kind), Some(i as f64));
        }
        assert_eq!(vitals.heart_rate, Some(4.0));
    }
}
