//! Main entry point for the credentials server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use credentials_server::logging::{log_welcome, setup_logging};
use credentials_server::{api, build_dispatcher, ServerSettings};
use tokio::net::TcpListener;
use tracing::info;

/// Credential and token lifecycle service
#[derive(Debug, Parser)]
#[command(name = "credentials-server", version, about)]
struct Cli {
    /// Configuration file (TOML, YAML, JSON, ...)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the configuration
    #[arg(long)]
    bind: Option<String>,

    /// SQLite database URL, overrides the configuration
    #[arg(long)]
    database_url: Option<String>,

    /// Log level, overrides the configuration
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings =
        ServerSettings::load(cli.config.as_deref()).context("invalid configuration")?;
    if let Some(bind) = cli.bind {
        settings.bind_address = bind;
    }
    if let Some(url) = cli.database_url {
        settings.database_url = Some(url);
    }
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    if cli.json_logs {
        settings.logging.json = true;
    }

    setup_logging(&settings.logging)?;
    log_welcome(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let dispatcher = build_dispatcher(&settings)
        .await
        .context("failed to start the credentials service")?;
    let app = api::create_router(Arc::new(dispatcher));

    let listener = TcpListener::bind(&settings.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
