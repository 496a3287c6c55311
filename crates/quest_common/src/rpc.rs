//! JSON-RPC 2.0 types for questd communication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::challenges::Challenge;
use crate::models::{Category, Profile, Task, TaskFilter};
use crate::scoring::Priority;
use crate::unlocks::{Avatar, Badge};

/// RPC methods supported by questd
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RpcMethod {
    Status,
    CreateTask,
    ListTasks,
    UpdateTask,
    DeleteTask,
    CompleteTask,
    Profile,
    ClaimDaily,
    Badges,
    Avatars,
    SelectAvatar,
    Challenges,
    Sweep,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: RpcMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    pub id: String,
}

impl RpcRequest {
    pub fn new(method: RpcMethod, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method,
            params,
            id: Uuid::new_v4().to_string(),
        }
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: String,
}

impl RpcResponse {
    pub fn success(id: String, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: String, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(RpcError { code, message, data: None }),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Parameters for create_task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskParams {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Parameters for list_tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTasksParams {
    #[serde(default)]
    pub filter: TaskFilter,
}

/// Parameters for update_task; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskParams {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Parameters for delete_task / complete_task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdParams {
    pub id: Uuid,
}

/// Parameters for select_avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectAvatarParams {
    pub id: String,
}

/// Everything a completion earned, layered over the base award.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    pub task_id: Uuid,
    /// Base XP from the task itself.
    pub points_earned: i64,
    /// Combo top-up over the base award; 0 when the combo step failed or
    /// the multiplier is 1x.
    pub bonus_points: i64,
    pub on_time: bool,
    pub current_combo: u32,
    pub combo_multiplier: u32,
    pub combo_broken: bool,
    pub current_streak: u32,
    pub new_badges: Vec<Badge>,
    pub new_avatars: Vec<Avatar>,
    pub completed_challenges: Vec<Challenge>,
    pub total_points: i64,
}

/// Result of claim_daily
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDailyResult {
    /// False when the reward was already claimed today (no-op).
    pub claimed: bool,
    pub reward: i64,
    pub current_streak: u32,
    pub total_points: i64,
}

/// Level tier as rendered to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelView {
    pub level: u32,
    pub name: String,
    pub min_points: i64,
    #[serde(default)]
    pub max_points: Option<i64>,
}

/// Profile plus derived level info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub profile: Profile,
    pub level: LevelView,
    pub progress_pct: f64,
    pub points_to_next: i64,
}

/// One catalog entry plus its unlock state for this user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeStatus {
    pub badge: Badge,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarStatus {
    pub avatar: Avatar,
    pub unlocked: bool,
    pub selected: bool,
}

/// One challenge plus this user's progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeStatus {
    pub challenge: Challenge,
    pub progress: i64,
    pub completed: bool,
}

/// One penalty the sweep actually charged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRecord {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub penalty: i64,
}

/// Report from one sweep pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub records: Vec<SweepRecord>,
}

/// Daemon health for the status command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub version: String,
    pub uptime_seconds: u64,
    pub pending_tasks: usize,
    pub sweep_interval_secs: u64,
}

/// Result of a task mutation that returns the task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: Task,
}
