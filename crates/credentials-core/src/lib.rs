//! # Credentials-Core
//!
//! Credential and token lifecycle engine.
//!
//! This crate provides:
//! - One-way password storage with Argon2id
//! - Dual-token (access + refresh) JWT issuance with separate secrets
//! - Token validation per token kind
//! - Refresh-token rotation backed by a hashed, per-user session slot
//! - A narrow `UserStore` interface with in-memory and SQLite implementations
//!
//! ## Architecture
//!
//! `AuthenticationService` orchestrates signup, signin, refresh, logout,
//! validate and `me`. It consults the `UserStore` and delegates to the
//! `PasswordHasher`, `TokenIssuer` and `TokenValidator`. The transport that
//! routes RPC messages to it lives in `credentials-server`.

pub mod error;
pub mod types;
pub mod config;
pub mod password;
pub mod jwt;
pub mod user_store;
pub mod auth;
pub mod validation;

pub use error::{Error, Result};
pub use types::{
    DecodedClaims, LoginRequest, NewUser, PublicUser, SessionInfo, SignupRequest, TokenPair,
    User, UserId, UserUpdate,
};
pub use config::{CredentialsConfig, JwtConfig, PasswordConfig, RotationPolicy};
pub use password::PasswordHasher;
pub use jwt::{TokenIssuer, TokenKind, TokenValidator};
pub use user_store::{MemoryUserStore, SqliteUserStore, UserStore};
pub use auth::AuthenticationService;

use std::sync::Arc;

/// Initialize the credential lifecycle engine on top of a user store.
///
/// Fails with [`Error::Config`] when either token secret is missing.
pub fn init(config: CredentialsConfig, store: Arc<dyn UserStore>) -> Result<AuthenticationService> {
    config.validate()?;

    let hasher = PasswordHasher::new(&config.password)?;
    let issuer = TokenIssuer::new(&config.jwt)?;
    let validator = TokenValidator::new(&config.jwt)?;

    Ok(AuthenticationService::new(
        store,
        hasher,
        issuer,
        validator,
        config.rotation_policy,
    ))
}
