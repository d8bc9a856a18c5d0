//! Authentication error types.

use thiserror::Error;

use eslhub_core::DomainError;

use crate::claims::TokenValidationError;

/// Why a presented token was refused.
///
/// Callers map every variant to "unauthenticated"; the split exists so the
/// rejection can be logged by kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, undecodable payload, or an impossible
    /// time window.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Signature checked out but the token is past its expiry.
    #[error("token has expired")]
    Expired,

    /// The token could not be produced.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid",
            Self::Expired => "expired",
            Self::Encoding(_) => "encoding",
        }
    }
}

impl From<TokenValidationError> for TokenError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::Expired => Self::Expired,
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<TokenError> for DomainError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => DomainError::internal(msg),
            other => DomainError::unauthenticated(other.to_string()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("account is deactivated")]
    AccountInactive,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::AccountInactive => {
                DomainError::unauthenticated(err.to_string())
            }
            AuthError::PasswordHash(msg) => DomainError::internal(msg),
            AuthError::Token(e) => e.into(),
        }
    }
}
