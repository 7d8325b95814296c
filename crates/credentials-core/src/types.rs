//! Core types for credentials-core

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::validate_display_name;

/// Store-assigned user identifier
pub type UserId = i64;

/// User record as held by the [`UserStore`](crate::UserStore)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    /// Hash of the latest issued refresh token; `None` means no active session.
    #[serde(skip_serializing, default)]
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a user; the store assigns `id` and `created_at`
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Partial update of a user record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub password_hash: Option<String>,
    pub name: Option<String>,
    /// `Some(None)` clears the stored refresh-token hash.
    pub refresh_token_hash: Option<Option<String>>,
}

impl UserUpdate {
    /// Replace the stored refresh-token hash
    pub fn set_refresh_token_hash(hash: impl Into<String>) -> Self {
        Self {
            refresh_token_hash: Some(Some(hash.into())),
            ..Default::default()
        }
    }

    /// Drop the stored refresh-token hash
    pub fn clear_refresh_token_hash() -> Self {
        Self {
            refresh_token_hash: Some(None),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, user: &mut User) {
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(refresh_token_hash) = self.refresh_token_hash {
            user.refresh_token_hash = refresh_token_hash;
        }
    }
}

/// User with the password hash and refresh-token hash stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// Signup payload
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 100), custom(function = "validate_display_name"))]
    pub name: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Signin payload
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Access token (short-lived) and refresh token (long-lived)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Claims extracted from a validated token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedClaims {
    #[serde(rename = "sub")]
    pub subject: UserId,
    pub email: String,
    #[serde(rename = "iat")]
    pub issued_at: u64,
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

/// Result of `me`: the current user plus a freshly rotated token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user: PublicUser,
    #[serde(flatten)]
    pub tokens: TokenPair,
}
