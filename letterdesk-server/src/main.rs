//! Letterdesk Server
//!
//! Serves the letter form pages and the JSON API that turns a submitted
//! academic record into a drafted letter via the Anthropic Messages API.
//!
//! Access via: http://localhost:5000

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

mod api;
mod cli;
mod config;
mod config_commands;
mod listener;
mod logging;
mod middleware;
mod pages;
mod router;
mod state;
#[cfg(test)]
mod test_helpers;

use cli::{Cli, Commands, ConfigCommands, ServeArgs};
use letterdesk_core::store::{connect_store, spawn_purge_task};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config(ConfigCommands::Show { json })) => {
            config_commands::show_config(&cli.serve, json)
        },
        Some(Commands::Serve) | None => {
            let _guard = logging::init_logging(&cli.log_level, cli.log_dir.as_deref())?;
            run_server(&cli.serve).await
        },
    }
}

async fn run_server(args: &ServeArgs) -> Result<()> {
    let config = config::load_config(args)?;

    info!("Letterdesk v{} starting...", env!("CARGO_PKG_VERSION"));
    if config.session.uses_default_secret() {
        tracing::warn!("Using the built-in session secret; set LETTERDESK_SESSION_SECRET in production");
    }

    let store = connect_store(&config.store).await.context("Failed to open store")?;
    let purge = spawn_purge_task(store.clone(), Duration::from_secs(config.store.purge_interval_secs));

    let state = AppState::new(config.clone(), store)?;
    info!(
        "Rate limits: generate {}/{}s, pages {}/{}s, store failure policy {}",
        config.rate_limit.generate.max_requests,
        config.rate_limit.generate.window_secs,
        config.rate_limit.page.max_requests,
        config.rate_limit.page.window_secs,
        config.rate_limit.failure_policy
    );

    let app = router::build_router(state);
    let (tcp, source) = listener::open(&config.server)?;
    info!("Server listening on {}", source);

    axum::serve(tcp, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(listener::shutdown_signal())
        .await?;

    purge.abort();
    info!("Server stopped");
    Ok(())
}
