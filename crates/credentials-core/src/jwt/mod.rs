//! JWT issuance and validation
//!
//! Access and refresh tokens are HS256 JWTs signed with distinct secrets and
//! carrying the same subject claims. Which secret (and TTL) applies is picked
//! by [`TokenKind`]; there is no server-side token table.

mod issuer;
mod verifier;

pub use issuer::TokenIssuer;
pub use verifier::TokenValidator;

use serde::{Deserialize, Serialize};

/// Which secret and lifetime a token is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims as they appear inside a signed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    pub sub: String,              // Subject (user ID)
    pub email: String,
    pub iat: u64,                 // Issued at
    pub exp: u64,                 // Expiration
    pub jti: String,              // JWT ID, unique per issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}
