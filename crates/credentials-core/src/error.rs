//! Error types for credential and token operations

use thiserror::Error;
use crate::types::UserId;

/// Errors raised by the lifecycle engine and its collaborators.
///
/// Display strings are user-safe: they never carry plaintext passwords,
/// password hashes or refresh-token hashes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("User already exists")]
    UserExists,

    #[error("User does not exist")]
    UserNotFound,

    #[error("Password is incorrect")]
    InvalidCredentials,

    /// Malformed, expired or signed with the wrong secret.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Store-level: the record vanished between lookup and update.
    #[error("User with ID {0} not found")]
    NotFound(UserId),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Store(err.to_string())
    }
}

// Only field names and error codes; validator's Display may echo the value.
impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let codes: Vec<&str> = errors.iter().map(|e| &*e.code).collect();
                format!("{}: {}", field, codes.join(", "))
            })
            .collect();
        fields.sort();
        Error::Validation(fields.join("; "))
    }
}
