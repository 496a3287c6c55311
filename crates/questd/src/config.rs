//! Daemon configuration, loaded from a JSON file with serde defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use quest_common::{CONFIG_PATH, DEFAULT_SWEEP_INTERVAL, SOCKET_PATH, STATE_DIR};

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "QUESTD_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub socket_path: PathBuf,
    pub db_path: PathBuf,
    pub sweep_interval_secs: u64,
    /// The user all CLI traffic is attributed to. Every row still carries an
    /// owner, so multi-user deployments only need to route this per request.
    pub default_user: Uuid,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(SOCKET_PATH),
            db_path: Path::new(STATE_DIR).join("questline.db"),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL,
            default_user: Uuid::nil(),
        }
    }
}

impl Config {
    /// Load from $QUESTD_CONFIG or the default path; missing or unreadable
    /// files fall back to defaults.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!("Loaded config from {}", path);
                    config
                }
                Err(e) => {
                    warn!("Invalid config at {}: {} (using defaults)", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
