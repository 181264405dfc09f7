//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! Storage errors are classified here so that no raw database error crosses an
//! operation boundary.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Bad input shape or value
    #[error("Validation error: {0}")]
    Validation(String),
    /// No caller identity on the request
    #[error("Authentication required")]
    Unauthenticated,
    /// Row absent, or owned by another user
    #[error("{0} not found")]
    NotFound(String),
    /// Membership or uniqueness invariant would be violated
    #[error("{0}")]
    Conflict(String),
    /// Bookshelf still holds owned books
    #[error("Cannot delete bookshelf with books. Please remove or move books first.")]
    NonEmptyShelf,
    /// Metadata resolver failed or timed out
    #[error("Metadata lookup unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(what.to_string())
    }

    /// Machine-stable kind carried in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::NotFound(_) => "not_found",
            DomainError::Conflict(_) => "conflict",
            DomainError::NonEmptyShelf => "non_empty_shelf",
            DomainError::UpstreamUnavailable(_) => "upstream_unavailable",
            DomainError::Database(_) => "database_error",
            DomainError::Internal(_) => "internal_error",
        }
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                DomainError::Conflict("This book is already in your collection".to_string())
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}
