//! Daemon state shared across connections.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::store::Store;

pub struct DaemonState {
    pub config: Config,
    pub store: Store,
    pub start_time: Instant,
}

impl DaemonState {
    pub fn new(config: Config, store: Store) -> Self {
        Self {
            config,
            store,
            start_time: Instant::now(),
        }
    }
}

pub type SharedState = Arc<DaemonState>;
