//! RPC boundary
//!
//! Decodes a message pattern plus JSON payload into a typed call on
//! [`AuthenticationService`] and maps the typed result back to JSON. Domain
//! errors become an [`RpcError`] carrying the error's display text.

mod payload;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use credentials_core::{AuthenticationService, LoginRequest, SignupRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use payload::{LogoutPayload, TokenPayload};

/// Incoming message: pattern name plus payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub pattern: String,
    #[serde(default)]
    pub data: Value,
}

/// Wire-level failure. The only thing a caller sees is `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RpcError {
    pub status: String,
    pub message: String,
}

impl RpcError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    /// Wrap a domain error; an empty message falls back to the command's
    /// fixed text.
    fn from_domain(command: Command, err: &credentials_core::Error) -> Self {
        let message = err.to_string();
        if message.is_empty() {
            Self::new(command.fallback_message())
        } else {
            Self::new(message)
        }
    }
}

/// Message patterns understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Signup,
    Login,
    Logout,
    ValidateToken,
    Refresh,
    Me,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Signup => "signup",
            Command::Login => "login",
            Command::Logout => "logout",
            Command::ValidateToken => "validateToken",
            Command::Refresh => "refresh",
            Command::Me => "me",
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Command::Signup => "Signup failed",
            Command::Login => "Login failed",
            Command::Logout => "Logout failed",
            Command::ValidateToken => "Token validation failed",
            Command::Refresh => "Token refresh failed",
            Command::Me => "Session lookup failed",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = RpcError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        match pattern {
            "signup" => Ok(Command::Signup),
            "login" => Ok(Command::Login),
            "logout" => Ok(Command::Logout),
            "validateToken" => Ok(Command::ValidateToken),
            "refresh" => Ok(Command::Refresh),
            "me" => Ok(Command::Me),
            _ => Err(RpcError::new(
                "There is no matching message handler defined in the remote service.",
            )),
        }
    }
}

/// Routes named messages to the lifecycle engine
#[derive(Clone)]
pub struct RpcDispatcher {
    service: Arc<AuthenticationService>,
}

impl RpcDispatcher {
    pub fn new(service: Arc<AuthenticationService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<AuthenticationService> {
        &self.service
    }

    /// Handle one message. Payloads and results never appear in logs.
    #[instrument(skip(self, data))]
    pub async fn dispatch(&self, pattern: &str, data: Value) -> Result<Value, RpcError> {
        let command = Command::from_str(pattern)?;

        let result = match command {
            Command::Signup => {
                let request: SignupRequest = decode(command, data)?;
                encode(command, self.service.signup(request).await)
            }
            Command::Login => {
                let request: LoginRequest = decode(command, data)?;
                encode(command, self.service.signin(request).await)
            }
            Command::Logout => {
                let payload: LogoutPayload = decode(command, data)?;
                let user_id = payload
                    .user_id()
                    .ok_or_else(|| RpcError::new("Invalid logout payload"))?;
                encode(command, self.service.logout(user_id).await)
            }
            Command::ValidateToken => {
                let payload: TokenPayload = decode(command, data)?;
                encode(command, self.service.validate(payload.token()))
            }
            Command::Refresh => {
                let payload: TokenPayload = decode(command, data)?;
                encode(command, self.service.refresh(payload.token()).await)
            }
            Command::Me => {
                let payload: TokenPayload = decode(command, data)?;
                encode(command, self.service.me(payload.token()).await)
            }
        };

        match &result {
            Ok(_) => debug!("{} handled", command),
            Err(e) => warn!("{} failed: {}", command, e.message),
        }
        result
    }
}

// Serde messages can quote the offending value, so the detail is dropped.
fn decode<T: DeserializeOwned>(command: Command, data: Value) -> Result<T, RpcError> {
    serde_json::from_value(data).map_err(|_| RpcError::new(format!("Invalid {} payload", command)))
}

fn encode<T: Serialize>(command: Command, result: credentials_core::Result<T>) -> Result<Value, RpcError> {
    match result {
        Ok(value) => {
            serde_json::to_value(value).map_err(|_| RpcError::new(command.fallback_message()))
        }
        Err(err) => Err(RpcError::from_domain(command, &err)),
    }
}
