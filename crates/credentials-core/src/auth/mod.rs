//! Authentication service
//!
//! Orchestrates the credential lifecycle on top of a [`UserStore`]:
//!
//! - `signup` / `signin` / `refresh` / `me` each end by issuing a fresh
//!   [`TokenPair`] and overwriting the user's stored refresh-token hash, so
//!   at most one refresh token per user is "current".
//! - `logout` clears that hash. Access tokens are never revoked; they stay
//!   valid until they expire.
//! - `validate` is a pure signature + expiry check on an access token.
//!
//! Nothing here locks: concurrent rotations for the same user race on the
//! store and the last write wins.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::RotationPolicy;
use crate::jwt::{TokenIssuer, TokenKind, TokenValidator};
use crate::password::PasswordHasher;
use crate::types::{
    DecodedClaims, LoginRequest, NewUser, PublicUser, SessionInfo, SignupRequest, TokenPair, User,
    UserId, UserUpdate,
};
use crate::user_store::UserStore;
use crate::validation::validate_signup;
use crate::{Error, Result};

/// Credential lifecycle manager
pub struct AuthenticationService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    validator: TokenValidator,
    rotation_policy: RotationPolicy,
}

impl AuthenticationService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        validator: TokenValidator,
        rotation_policy: RotationPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            validator,
            rotation_policy,
        }
    }

    /// Register a new user and open their first session.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<TokenPair> {
        validate_signup(&request)?;

        if self.store.find_by_email(&request.email).await?.is_some() {
            warn!("Signup rejected: user exists");
            return Err(Error::UserExists);
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let user = self
            .store
            .create(NewUser {
                email: request.email,
                password_hash,
                name: request.name,
            })
            .await?;

        let tokens = self.rotate_session(&user).await?;
        info!(user_id = user.id, "User signed up");
        Ok(tokens)
    }

    /// Verify credentials and replace the user's session.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signin(&self, request: LoginRequest) -> Result<TokenPair> {
        let user = self
            .store
            .find_by_email(&request.email)
            .await?
            .ok_or(Error::UserNotFound)?;

        if !self.hasher.verify(&user.password_hash, &request.password).await {
            warn!(user_id = user.id, "Signin rejected: bad password");
            return Err(Error::InvalidCredentials);
        }

        let tokens = self.rotate_session(&user).await?;
        info!(user_id = user.id, "User signed in");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Under [`RotationPolicy::Lenient`] the presented token is not compared
    /// with the stored hash, so a rotated-away but unexpired refresh token
    /// still works. [`RotationPolicy::Strict`] rejects anything but the
    /// latest one.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.validator.validate(refresh_token, TokenKind::Refresh)?;

        let user = self
            .store
            .find_by_id(claims.subject)
            .await?
            .ok_or(Error::UserNotFound)?;

        if self.rotation_policy == RotationPolicy::Strict {
            let current = match &user.refresh_token_hash {
                Some(hash) => self.hasher.verify(hash, refresh_token).await,
                None => false,
            };
            if !current {
                warn!(user_id = user.id, "Refresh rejected: token is not the current one");
                return Err(Error::InvalidToken);
            }
        }

        let tokens = self.rotate_session(&user).await?;
        info!(user_id = user.id, "Session refreshed");
        Ok(tokens)
    }

    /// Drop the stored refresh-token hash. Issued access tokens stay valid.
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: UserId) -> Result<PublicUser> {
        let user = self
            .store
            .update(user_id, UserUpdate::clear_refresh_token_hash())
            .await?;

        info!(user_id, "User logged out");
        Ok(user.into())
    }

    /// Check an access token and return its claims.
    pub fn validate(&self, access_token: &str) -> Result<DecodedClaims> {
        self.validator.validate(access_token, TokenKind::Access)
    }

    /// Who am I, plus a rotated session.
    #[instrument(skip(self, access_token))]
    pub async fn me(&self, access_token: &str) -> Result<SessionInfo> {
        let claims = self.validate(access_token)?;

        let user = self
            .store
            .find_by_id(claims.subject)
            .await?
            .ok_or(Error::UserNotFound)?;

        let tokens = self.rotate_session(&user).await?;
        Ok(SessionInfo {
            user: user.into(),
            tokens,
        })
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        self.rotation_policy
    }

    /// Issue a pair and persist the refresh token's hash. The pair is only
    /// returned once the hash is stored.
    async fn rotate_session(&self, user: &User) -> Result<TokenPair> {
        let tokens = self.issuer.issue(user.id, &user.email).await?;
        let refresh_hash = self.hasher.hash(&tokens.refresh_token).await?;

        self.store
            .update(user.id, UserUpdate::set_refresh_token_hash(refresh_hash))
            .await?;

        Ok(tokens)
    }
}
