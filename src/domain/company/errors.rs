use crate::store::StoreError;
use super::validation::ValidationError;
use super::value_objects::CompanyId;

// ============================================================================
// Company Command Errors
// ============================================================================
//
// One variant per pipeline stage that can abort a request. Event publishing
// has no variant here: a failed publish never fails a command.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    #[error("Invalid input data: {0}")]
    MalformedInput(String),

    #[error("the parameter 'id' is not a valid UUID")]
    InvalidIdentifier(String),

    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),

    #[error("a company named '{0}' already exists")]
    Conflict(String),

    #[error("the change conflicts with an existing company")]
    ConflictingChange,

    #[error("record not found")]
    NotFound(CompanyId),

    #[error("could not {operation} company record")]
    PersistenceFailed {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CompanyError {
    /// Label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CompanyError::MalformedInput(_) => "malformed_input",
            CompanyError::InvalidIdentifier(_) => "invalid_identifier",
            CompanyError::ValidationFailed(_) => "validation_failed",
            CompanyError::Conflict(_) | CompanyError::ConflictingChange => "conflict",
            CompanyError::NotFound(_) => "not_found",
            CompanyError::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}
