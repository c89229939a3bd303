//! ASA physical-status class.
//!
//! [`AsaClass`] guarantees a value in `1..=5` once constructed, both from user text and from
//! persisted snapshots.

use crate::constants::{ASA_MAX, ASA_MIN};
use std::num::IntErrorKind;

/// Errors raised by the ASA gate. A submission failing here creates no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsaError {
    /// The ASA field is not an integer.
    #[error("Please enter a valid ASA classification.")]
    Unparsable(String),
    /// The ASA field is an integer outside 1 to 5.
    #[error("ASA classification must be between 1 and 5.")]
    OutOfRange(i64),
}

/// A validated ASA physical-status class (1 = healthy, 5 = moribund).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsaClass(u8);

impl AsaClass {
    /// Parses ASA text as entered by a user.
    ///
    /// Surrounding whitespace is ignored. Decimal notation such as `"3.0"` is not an integer
    /// and is rejected as unparsable.
    ///
    /// # Errors
    ///
    /// Returns [`AsaError::Unparsable`] for non-integer text and [`AsaError::OutOfRange`] for
    /// integers outside 1 to 5, including integers too large for `i64`.
    pub fn parse(input: &str) -> Result<Self, AsaError> {
        let trimmed = input.trim();
        let value = trimmed.parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => AsaError::OutOfRange(i64::MAX),
            IntErrorKind::NegOverflow => AsaError::OutOfRange(i64::MIN),
            _ => AsaError::Unparsable(trimmed.to_string()),
        })?;
        Self::new(value)
    }

    /// Creates a class from an integer.
    ///
    /// # Errors
    ///
    /// Returns [`AsaError::OutOfRange`] if `value` is outside 1 to 5.
    pub fn new(value: i64) -> Result<Self, AsaError> {
        if !(ASA_MIN..=ASA_MAX).contains(&value) {
            return Err(AsaError::OutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for AsaClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for AsaClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for AsaClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        AsaClass::new(value).map_err(serde::de::Error::custom)
    }
}
