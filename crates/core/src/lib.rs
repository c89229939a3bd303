//! # Preop Core
//!
//! Core business logic for the Preop pre-anaesthetic assessment system.
//!
//! This crate contains the validation and classification engine and its storage:
//! - Parsing and range-checking of vital-sign readings ([`validation`], [`vitals`])
//! - ASA class gating ([`asa`]) and risk classification ([`risk`])
//! - The procedure-risk advisory ([`procedure`])
//! - Static drug reference data ([`drugs`])
//! - The session owning the patient list ([`session`]) and its JSON snapshot ([`store`])
//!
//! **No API concerns**: HTTP servers and command-line parsing belong in `api-rest` and `cli`.

pub mod asa;
pub mod config;
pub mod constants;
pub mod drugs;
pub mod error;
pub mod procedure;
pub mod risk;
pub mod session;
pub mod store;
pub mod validation;
pub mod vitals;

pub use asa::{AsaClass, AsaError};
pub use config::CoreConfig;
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use drugs::{find_drug, formulary, DrugCategory, DrugReference};
pub use error::{PlannerError, PlannerResult};
pub use procedure::{Advisory, AdvisoryLevel, ProcedureName};
pub use risk::{Classification, RiskClassifier, RiskTier};
pub use session::Session;
pub use store::PatientStore;
pub use validation::{
    AbnormalityFinding, FindingField, FindingKind, PatientRecord, RawReading, ValidationEngine,
};
pub use vitals::{NormalRange, RangeTable, VitalSignKind, Vitals};
