//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure path in the core resolves to exactly one of these kinds; the
/// HTTP layer maps each kind to one outward status code. Storage driver
/// details never travel inside these values beyond a log-friendly message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input shape (missing fields, bad email, empty password).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing/invalid/expired credential, or the subject no longer resolves.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// A uniqueness constraint was violated on create/update.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No record at the given identifier (including identifiers that are not
    /// well-formed for the storage engine).
    #[error("not found")]
    NotFound,

    /// The storage collaborator could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Anything unexpected (corrupt documents, hashing failures, join errors).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Unauthenticated(_) => "unauthorized",
            Self::Conflict(_) => "conflict",
            Self::NotFound => "not_found",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_kind() {
        let all = [
            DomainError::validation("x"),
            DomainError::unauthenticated("x"),
            DomainError::conflict("x"),
            DomainError::not_found(),
            DomainError::storage_unavailable("x"),
            DomainError::internal("x"),
        ];
        let mut codes: Vec<_> = all.iter().map(DomainError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
