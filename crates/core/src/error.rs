use crate::asa::AsaError;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Asa(#[from] AsaError),
    #[error("ASA class {0} cannot be classified (expected 1 to 5)")]
    Classification(i64),
    #[error("patient information required first")]
    MissingPatient,

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write patient snapshot: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read patient snapshot: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize patients: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patients: {0}")]
    Deserialization(String),
}

impl PlannerError {
    /// Returns `true` for failures of the durable storage layer.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            PlannerError::StorageDirCreation(_)
                | PlannerError::FileWrite(_)
                | PlannerError::FileRead(_)
                | PlannerError::Serialization(_)
                | PlannerError::Deserialization(_)
        )
    }
}

pub type PlannerResult<T> = std::result::Result<T, PlannerError>;
