//! Process configuration
//!
//! Layers, lowest priority first:
//! 1. built-in defaults
//! 2. an optional TOML (or any `config`-supported) file
//! 3. `CREDENTIALS__*` environment variables, `__` between sections,
//!    e.g. `CREDENTIALS__AUTH__JWT__ACCESS_TTL_SECONDS=600`
//! 4. the plain variables `PORT`, `JWT_ACCESS_SECRET`, `JWT_REFRESH_SECRET`
//!
//! Both token secrets are required; without them loading fails and the
//! process must not start.

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use credentials_core::CredentialsConfig;
use serde::Deserialize;

use crate::logging::LoggingConfig;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("{0}")]
    Invalid(#[from] credentials_core::Error),
}

/// Top-level server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    /// SQLite URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub auth: CredentialsConfig,
    pub logging: LoggingConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
            database_url: None,
            auth: CredentialsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerSettings {
    /// Load from the process environment and an optional file
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_from(path, std::env::vars())
    }

    /// Load with an explicit set of environment variables
    pub fn load_from(
        path: Option<&Path>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, SettingsError> {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CREDENTIALS")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone())),
        );

        if let Some(port) = vars.get("PORT") {
            builder = builder.set_override("bind_address", format!("0.0.0.0:{}", port.trim()))?;
        }
        if let Some(secret) = vars.get("JWT_ACCESS_SECRET") {
            builder = builder.set_override("auth.jwt.access_secret", secret.clone())?;
        }
        if let Some(secret) = vars.get("JWT_REFRESH_SECRET") {
            builder = builder.set_override("auth.jwt.refresh_secret", secret.clone())?;
        }

        let settings: ServerSettings = builder.build()?.try_deserialize()?;
        settings.auth.validate()?;
        Ok(settings)
    }
}
