//! Token issuance

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::debug;
use uuid::Uuid;

use super::{TokenClaims, TokenKind};
use crate::config::JwtConfig;
use crate::types::{TokenPair, UserId};
use crate::{Error, Result};

struct SigningKey {
    key: Arc<EncodingKey>,
    ttl: Duration,
}

/// Creates signed access and refresh tokens for a subject
pub struct TokenIssuer {
    access: SigningKey,
    refresh: SigningKey,
    header: Header,
    issuer: Option<String>,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Result<Self> {
        config.validate()?;

        let access = SigningKey {
            key: Arc::new(EncodingKey::from_secret(config.access_secret.as_bytes())),
            ttl: ttl_from_seconds(config.access_ttl_seconds)?,
        };
        let refresh = SigningKey {
            key: Arc::new(EncodingKey::from_secret(config.refresh_secret.as_bytes())),
            ttl: ttl_from_seconds(config.refresh_ttl_seconds)?,
        };

        Ok(Self {
            access,
            refresh,
            header: Header::new(Algorithm::HS256),
            issuer: config.issuer.clone(),
        })
    }

    /// Sign an access and a refresh token concurrently on the blocking pool.
    ///
    /// Both tokens carry the same `iat`. The pair only exists as a unit: if
    /// either signing fails, nothing is returned.
    pub async fn issue(&self, subject: UserId, email: &str) -> Result<TokenPair> {
        let issued_at = Utc::now();
        let (access_token, refresh_token) = tokio::try_join!(
            self.spawn_sign(TokenKind::Access, subject, email, issued_at),
            self.spawn_sign(TokenKind::Refresh, subject, email, issued_at),
        )?;

        debug!("Issued token pair for user {}", subject);
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn spawn_sign(
        &self,
        kind: TokenKind,
        subject: UserId,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        let claims = self.claims(kind, subject, email, issued_at)?;
        let key = Arc::clone(&self.key_for(kind).key);
        let header = self.header.clone();

        tokio::task::spawn_blocking(move || encode_claims(kind, &header, &claims, &key))
            .await
            .map_err(|e| Error::Signing(format!("{} signing task failed: {}", kind, e)))?
    }

    /// Sign a single token as if issued at `issued_at`.
    pub fn sign_at(
        &self,
        kind: TokenKind,
        subject: UserId,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        let claims = self.claims(kind, subject, email, issued_at)?;
        encode_claims(kind, &self.header, &claims, &self.key_for(kind).key)
    }

    fn claims(
        &self,
        kind: TokenKind,
        subject: UserId,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenClaims> {
        let exp = issued_at
            .checked_add_signed(self.key_for(kind).ttl)
            .ok_or_else(|| Error::Signing(format!("{} token expiry overflows", kind)))?;

        Ok(TokenClaims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp().max(0) as u64,
            exp: exp.timestamp().max(0) as u64,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        })
    }

    /// Lifetime of tokens of this kind
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        self.key_for(kind).ttl
    }

    fn key_for(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

fn encode_claims(
    kind: TokenKind,
    header: &Header,
    claims: &TokenClaims,
    key: &EncodingKey,
) -> Result<String> {
    encode(header, claims, key).map_err(|e| Error::Signing(format!("{} token: {}", kind, e)))
}

fn ttl_from_seconds(seconds: u64) -> Result<Duration> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| Error::Config(format!("Token TTL out of range: {}s", seconds)))
}
