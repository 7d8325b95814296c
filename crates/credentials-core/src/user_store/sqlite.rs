//! SQLite-backed user store

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::UserStore;
use crate::types::{NewUser, User, UserId, UserUpdate};
use crate::{Error, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    refresh_token_hash TEXT,
    created_at TEXT NOT NULL
)
"#;

const USER_COLUMNS: &str = "id, email, password_hash, name, refresh_token_hash, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    name: String,
    refresh_token_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            refresh_token_hash: row.refresh_token_hash,
            created_at: row.created_at,
        }
    }
}

/// `sqlx` SQLite store; cloning shares the pool.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Connect (creating the database file if needed) and ensure the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` is its own database, so the pool must
        // hold exactly one connection and never retire it.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("User store ready at {}", database_url);

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, password_hash, name, refresh_token_hash, created_at) \
             VALUES (?, ?, ?, NULL, ?) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Error::UserExists,
            other => Error::from(other),
        })?;

        debug!("Created user {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, id: UserId, update: UserUpdate) -> Result<User> {
        let (touch_refresh, refresh_token_hash) = match update.refresh_token_hash {
            Some(value) => (true, value),
            None => (false, None),
        };

        // One statement, so the record is never observed half-updated.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                password_hash = COALESCE(?, password_hash), \
                name = COALESCE(?, name), \
                refresh_token_hash = CASE WHEN ? THEN ? ELSE refresh_token_hash END \
             WHERE id = ? RETURNING {}",
            USER_COLUMNS
        ))
        .bind(update.password_hash)
        .bind(update.name)
        .bind(touch_refresh)
        .bind(refresh_token_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from).ok_or(Error::NotFound(id))
    }
}
