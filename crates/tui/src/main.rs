mod app;
mod input;
mod login;
mod screen;
mod theme;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use sgadmin_core::{
    config::{self, AppConfig},
    ApiClient, SessionStore,
};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    tracing::info!(api = %config.api_base_url, "Starting sgadmin");

    let session = SessionStore::new(&config.session_dir);
    let api = ApiClient::new(&config, session.clone()).context("failed to build API client")?;

    let mut app = app::AdminApp::new(api, session);
    let result = app.run().await;
    if let Err(err) = &result {
        tracing::error!("Console exited with error: {err:#}");
    }
    result
}

// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
    let log_path = log_dir.join("sgadmin.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
