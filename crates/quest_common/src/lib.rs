//! Shared types and game rules for Questline components.
//!
//! The gamification engine lives here: scoring, levels, combos, streaks,
//! badge/avatar unlocks, challenge progress, and the overdue penalty rule.
//! Everything in these modules is a pure function over snapshots supplied by
//! the caller; persistence and scheduling belong to questd.

pub mod catalog;
pub mod challenges;
pub mod combo;
pub mod error;
pub mod ledger;
pub mod levels;
pub mod models;
pub mod penalty;
pub mod rpc;
pub mod scoring;
pub mod streak;
pub mod unlocks;

pub use error::QuestError;
pub use ledger::{PointDelta, PointDeltaKind};
pub use models::{Profile, Task, TaskFilter};
pub use rpc::{RpcError, RpcMethod, RpcRequest, RpcResponse};
pub use scoring::Priority;
pub use unlocks::{Avatar, Badge, ProfileSnapshot, Rarity, Requirement};

/// Default socket path for questd
pub const SOCKET_PATH: &str = "/run/questline/questd.sock";

/// Environment variable overriding the socket path
pub const SOCKET_ENV: &str = "QUESTD_SOCKET";

/// State directory for Questline
pub const STATE_DIR: &str = "/var/lib/questline";

/// Config file path
pub const CONFIG_PATH: &str = "/var/lib/questline/config.json";

/// Default overdue sweep interval in seconds
pub const DEFAULT_SWEEP_INTERVAL: u64 = 3600;
