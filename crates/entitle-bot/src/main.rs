use std::sync::Arc;

use anyhow::{Context, Result};
use entitle::store::SqliteStore;
use entitle::{Ledger, LedgerConfig};
use entitle_bot::transport::console::ConsoleTransport;
use entitle_bot::{BotConfig, Dispatcher, Supervisor};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,entitle=debug".into()),
        )
        .init();

    let config = BotConfig::load().context("failed to load configuration")?;
    info!(db = %config.ledger_db_path, "Starting Entitle bot");

    let store = SqliteStore::open(&config.ledger_db_path)
        .with_context(|| format!("failed to open ledger at {}", config.ledger_db_path))?;
    let ledger = Arc::new(Ledger::new(store, LedgerConfig::default()));

    let mut dispatcher = Dispatcher::new(ledger, config.admins()?);
    if let Some(name) = &config.bot_name {
        dispatcher = dispatcher.with_bot_name(name);
    }

    let supervisor = Supervisor::new(Arc::new(ConsoleTransport::stdio()), Arc::new(dispatcher))
        .with_backoff(config.restart_backoff());

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        _ = supervisor.run() => {
            info!("Input closed");
        }
    }

    info!("Shutting down gracefully...");

    Ok(())
}
