//! User record storage
//!
//! The lifecycle engine only ever holds transient copies of a [`User`]; the
//! store owns the records and is expected to be linearizable per record.
//! Concurrent writers to the same record follow last-writer-wins.

mod memory;
mod sqlite;

pub use memory::MemoryUserStore;
pub use sqlite::SqliteUserStore;

use async_trait::async_trait;

use crate::types::{NewUser, User, UserId, UserUpdate};
use crate::Result;

/// User storage trait
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive match on email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Assigns `id` and `created_at`; fails `UserExists` on a taken email.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Fails `NotFound(id)` when no such record exists.
    async fn update(&self, id: UserId, update: UserUpdate) -> Result<User>;
}
