//! `eslhub-auth` provides identity primitives: password hashing, access tokens and
//! the user account document.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod error;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use error::{AuthError, TokenError};
pub use password::{HashCost, PasswordHasher};
pub use principal::Principal;
pub use roles::Role;
pub use token::{SigningAlgorithm, TokenService};
pub use user::{User, UserPatch};
