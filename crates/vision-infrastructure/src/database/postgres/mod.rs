//! PostgreSQL repository implementations

pub mod company_repo_impl;
pub mod grant_repo_impl;
pub mod vision_repo_impl;

pub use company_repo_impl::PgCompanyRepository;
pub use grant_repo_impl::PgGrantRepository;
pub use vision_repo_impl::PgVisionRepository;

use vision_core::error::DomainError;

/// Map a sqlx failure onto the domain error taxonomy: connection-level
/// failures are retryable, unique-index violations are conflicts, everything
/// else is a plain database error.
pub(crate) fn map_sqlx_error(context: &str, e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::Io(err) => DomainError::StoreUnavailable(format!("{context}: {err}")),
        sqlx::Error::PoolTimedOut => {
            DomainError::StoreUnavailable(format!("{context}: connection pool timed out"))
        }
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::VisionConflict {
            conflicting: None,
            reason: format!("storage uniqueness constraint rejected the write: {}", db.message()),
        },
        other => DomainError::DatabaseError(format!("{context}: {other}")),
    }
}
