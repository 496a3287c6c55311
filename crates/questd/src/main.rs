//! Questline daemon.
//!
//! Owns the task/profile stores, runs the completion trigger and the
//! overdue-penalty sweep, and serves JSON-RPC over a Unix socket.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use questd::config::Config;
use questd::rpc_server;
use questd::state::DaemonState;
use questd::store::Store;
use questd::sweep;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("questd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let store = Store::open(&config.db_path)?;
    info!("Store opened at {}", config.db_path.display());

    let state = Arc::new(DaemonState::new(config, store));

    tokio::spawn(sweep::sweep_loop(state.clone()));

    tokio::select! {
        result = rpc_server::start_server(state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down gracefully");
        }
    }

    Ok(())
}
