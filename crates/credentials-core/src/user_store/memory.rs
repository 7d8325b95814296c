//! In-memory user store

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use super::UserStore;
use crate::types::{NewUser, User, UserId, UserUpdate};
use crate::{Error, Result};

/// `DashMap`-backed store; cloning shares the same records.
#[derive(Clone)]
pub struct MemoryUserStore {
    /// Map of user id to record
    users: Arc<DashMap<UserId, User>>,
    /// Map of email to user id
    emails: Arc<DashMap<String, UserId>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            emails: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let Some(id) = self.emails.get(email).map(|entry| *entry) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        // The email slot stays locked until the record is in place.
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(Error::UserExists),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let record = User {
                    id,
                    email: user.email,
                    password_hash: user.password_hash,
                    name: user.name,
                    refresh_token_hash: None,
                    created_at: Utc::now(),
                };
                self.users.insert(id, record.clone());
                slot.insert(id);
                debug!("Created user {}", id);
                Ok(record)
            }
        }
    }

    async fn update(&self, id: UserId, update: UserUpdate) -> Result<User> {
        let mut entry = self.users.get_mut(&id).ok_or(Error::NotFound(id))?;
        update.apply(entry.value_mut());
        Ok(entry.clone())
    }
}
