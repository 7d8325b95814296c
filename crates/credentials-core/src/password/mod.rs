//! Password hashing using Argon2id
//!
//! Hashes are PHC strings with a fresh random salt per call, so hashing the
//! same input twice gives two different strings that both verify. The same
//! hasher protects refresh tokens at rest.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use tracing::warn;

use crate::config::PasswordConfig;
use crate::{Error, Result};

/// One-way hash and verify for credential secrets
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| Error::Config(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash on the blocking pool so the async scheduler is never held up.
    pub async fn hash(&self, plaintext: &str) -> Result<String> {
        let argon2 = self.argon2.clone();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || hash_with(&argon2, &plaintext))
            .await
            .map_err(|e| Error::Hashing(format!("hashing task failed: {}", e)))?
    }

    /// `false` on mismatch and on a malformed stored hash; never an error.
    pub async fn verify(&self, hash: &str, plaintext: &str) -> bool {
        let argon2 = self.argon2.clone();
        let hash = hash.to_owned();
        let plaintext = plaintext.to_owned();

        match tokio::task::spawn_blocking(move || verify_with(&argon2, &hash, &plaintext)).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Password verification task failed: {}", e);
                false
            }
        }
    }

    pub fn hash_blocking(&self, plaintext: &str) -> Result<String> {
        hash_with(&self.argon2, plaintext)
    }

    pub fn verify_blocking(&self, hash: &str, plaintext: &str) -> bool {
        verify_with(&self.argon2, hash, plaintext)
    }
}

fn hash_with(argon2: &Argon2<'_>, plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Hashing(e.to_string()))
}

fn verify_with(argon2: &Argon2<'_>, hash: &str, plaintext: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!("Stored hash is not a valid PHC string: {}", e);
            false
        }
    }
}
