//! # Credentials-Server
//!
//! Routes named RPC messages (`signup`, `login`, `logout`, `validateToken`,
//! `refresh`, `me`) to the credentials-core lifecycle engine and exposes
//! them over HTTP.
//!
//! Every failure leaves this crate as a single wire-level error carrying a
//! message string; callers distinguish failure kinds by message only.

pub mod api;
pub mod logging;
pub mod rpc;
pub mod settings;

pub use rpc::{Command, RpcDispatcher, RpcError, RpcRequest};
pub use settings::{ServerSettings, SettingsError};

use std::sync::Arc;

use credentials_core::{MemoryUserStore, SqliteUserStore, UserStore};
use tracing::warn;

/// Open the configured store and build the dispatcher on top of it.
pub async fn build_dispatcher(settings: &ServerSettings) -> credentials_core::Result<RpcDispatcher> {
    let store: Arc<dyn UserStore> = match &settings.database_url {
        Some(url) => Arc::new(SqliteUserStore::connect(url).await?),
        None => {
            warn!("No database_url configured; users are kept in memory only");
            Arc::new(MemoryUserStore::new())
        }
    };

    let service = credentials_core::init(settings.auth.clone(), store)?;
    Ok(RpcDispatcher::new(Arc::new(service)))
}
