//! Error types for Questline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestError {
    #[error("Daemon not running. Start questd first.")]
    DaemonNotRunning,

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task already completed: {0}")]
    AlreadyCompleted(String),

    #[error("Unknown avatar: {0}")]
    UnknownAvatar(String),

    #[error("Avatar not unlocked yet: {0}")]
    AvatarLocked(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuestError {
    pub fn code(&self) -> i32 {
        match self {
            QuestError::DaemonNotRunning => -32000,
            QuestError::TaskNotFound(_) => -32001,
            QuestError::AlreadyCompleted(_) => -32002,
            QuestError::UnknownAvatar(_) => -32003,
            QuestError::AvatarLocked(_) => -32004,
            QuestError::Store(_) => -32005,
            QuestError::Rpc(_) => -32600,
            QuestError::Io(_) => -32006,
            QuestError::Json(_) => -32700,
            QuestError::Internal(_) => -32603,
        }
    }
}
