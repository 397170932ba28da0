//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Permission denied for client {0}")]
    PermissionDenied(Uuid),

    #[error("Vision type {0} is not selectable with the current grants")]
    VisionTypeNotAllowed(String),

    #[error("Vision conflict: {reason}")]
    VisionConflict {
        /// Known when the pre-flight validator found the collision;
        /// absent when the storage constraint rejected the write.
        conflicting: Option<Uuid>,
        reason: String,
    },

    #[error("Company {0} is outside the operator's accessible roster")]
    CompanyOutsideScope(Uuid),

    #[error("Vision not found")]
    VisionNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Whether the caller may retry the operation unchanged.
    /// Deterministic rejections (permission, conflict, validation) are not
    /// retryable; only transient store failures are.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::StoreUnavailable(_))
    }
}
