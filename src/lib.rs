pub mod types;
pub mod error;
pub mod config;
pub mod store;
pub mod lock_clock;
pub mod phase_gate;
pub mod scoring;
pub mod settlement;
pub mod reconcile;
pub mod picks;
pub mod admin;
pub mod standings;
pub mod commands;
pub mod server;
#[cfg(test)]
mod test_support;

use types::*;
use config::*;
use error::StoreError;
use store::JsonStore;

use std::{
    fs,
    sync::{Arc, Mutex},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn open_store(config: &AppConfig) -> Result<JsonStore, StoreError> {
    let Some(path) = data_path(config) else {
        return Ok(JsonStore::in_memory());
    };
    let store = JsonStore::open(&path)?;
    info!("store loaded from {}", path.display());
    Ok(store)
}

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() {
    load_env_file();

    // Initialize tracing with a daily rolling file
    let logs_dir = logs_dir();
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("Worlds pick'em starting");

    let config = match load_config_inner() {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}; using defaults");
            AppConfig::default()
        }
    };
    if !config_path().is_file() {
        if let Err(e) = save_config_inner(config.clone()) {
            warn!("could not write default config: {e}");
        }
    }
    log_env_warnings(&config);

    // An unreadable data file must never be replaced by an empty snapshot.
    let store = match open_store(&config) {
        Ok(store) => store,
        Err(e) => {
            error!("failed to open store: {e}");
            return;
        }
    };
    let store: SharedStore = Arc::new(Mutex::new(store));
    let state = CommandState {
        store: store.clone(),
        config: config.clone(),
    };
    server::spawn_lock_job(state);

    if !config.http_enabled {
        info!("status server disabled; lock job running");
        loop {
            std::thread::park();
        }
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to start async runtime: {e}");
            return;
        }
    };
    let status_state = StatusServerState {
        store,
        standings_limit: config.standings_limit,
    };
    runtime.block_on(server::start_status_server(status_state, config.http_addr));
}
