//! Configuration for credentials-core
//!
//! Secrets are injected explicitly; nothing here reads the process
//! environment. Loading from files and environment variables is the
//! server's job.

use std::fmt;

use serde::Deserialize;
use tracing::warn;

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub rotation_policy: RotationPolicy,
}

/// Token signing configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    /// Clock skew tolerated when checking `exp`
    pub leeway_seconds: u64,
    /// When set, written as `iss` and required on validation
    pub issuer: Option<String>,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub argon2_memory_cost: u32,
    pub argon2_time_cost: u32,
    pub argon2_parallelism: u32,
}

/// What `refresh` does with the stored refresh-token hash before rotating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Rotate without comparing the presented token to the stored hash.
    /// A rotated-away refresh token keeps minting pairs until it expires.
    #[default]
    Lenient,
    /// Reject a refresh token that is not the latest one issued.
    Strict,
}

impl CredentialsConfig {
    /// Build a configuration from the two signing secrets, defaults elsewhere
    pub fn with_secrets(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            jwt: JwtConfig {
                access_secret: access_secret.into(),
                refresh_secret: refresh_secret.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.jwt.validate()?;
        self.password.validate()
    }
}

impl JwtConfig {
    /// Both secrets are required; a missing one is a startup error.
    pub fn validate(&self) -> Result<()> {
        if self.access_secret.is_empty() {
            return Err(Error::Config("JWT access secret is required".to_string()));
        }
        if self.refresh_secret.is_empty() {
            return Err(Error::Config("JWT refresh secret is required".to_string()));
        }
        if self.access_ttl_seconds == 0 || self.refresh_ttl_seconds == 0 {
            return Err(Error::Config("Token TTLs must be positive".to_string()));
        }
        if self.access_secret == self.refresh_secret {
            warn!("Access and refresh secrets are identical; token kinds cannot be told apart");
        }
        Ok(())
    }
}

impl PasswordConfig {
    pub fn validate(&self) -> Result<()> {
        argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .map(|_| ())
        .map_err(|e| Error::Config(format!("Invalid Argon2 parameters: {}", e)))
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_seconds: 900,       // 15 minutes
            refresh_ttl_seconds: 604_800,  // 7 days
            leeway_seconds: 0,
            issuer: None,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost: 19_456,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
        }
    }
}
