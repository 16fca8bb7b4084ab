mod bot;
mod config;
mod event;
mod greetings;
mod platform;
mod reply;
mod search;
mod server;
mod transcription;
mod update;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,searchbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // An explicit path must exist; the default one is optional.
    let explicit_path = std::env::args().nth(1).map(PathBuf::from);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path, explicit_path.is_some())
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Stage: {}", config.stage);
    info!("  Search model: {}", config.openai.search_model);
    info!("  Transcription model: {}", config.openai.transcription_model);

    let state = Arc::new(AppState::from_config(&config)?);

    info!("Bot is starting...");
    server::serve(state, &config.server.bind_address, config.is_local()).await?;

    Ok(())
}
