//! Token validation

use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::{TokenClaims, TokenKind};
use crate::config::JwtConfig;
use crate::types::DecodedClaims;
use crate::{Error, Result};

/// Verifies signature, structure and expiry of a token of a given kind.
///
/// Validity is purely cryptographic and time-based. There is no revocation
/// list: an unexpired access token stays valid after logout.
pub struct TokenValidator {
    access_key: Arc<DecodingKey>,
    refresh_key: Arc<DecodingKey>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &JwtConfig) -> Result<Self> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        validation.validate_exp = true;

        let mut required = vec!["exp", "sub"];
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
            required.push("iss");
        }
        validation.set_required_spec_claims(&required);

        Ok(Self {
            access_key: Arc::new(DecodingKey::from_secret(config.access_secret.as_bytes())),
            refresh_key: Arc::new(DecodingKey::from_secret(config.refresh_secret.as_bytes())),
            validation,
        })
    }

    /// Decode `token` as a `kind` token.
    ///
    /// Every failure (bad signature, wrong kind, malformed, expired) is
    /// [`Error::InvalidToken`]; the precise reason is only logged.
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<DecodedClaims> {
        let key = match kind {
            TokenKind::Access => &self.access_key,
            TokenKind::Refresh => &self.refresh_key,
        };

        let data = decode::<TokenClaims>(token, key, &self.validation).map_err(|e| {
            debug!("Rejected {} token: {}", kind, e);
            Error::InvalidToken
        })?;

        let claims = data.claims;
        let subject = claims.sub.parse().map_err(|_| {
            debug!("Rejected {} token: non-numeric subject", kind);
            Error::InvalidToken
        })?;

        Ok(DecodedClaims {
            subject,
            email: claims.email,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
