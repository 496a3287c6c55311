//! RPC request dispatch.

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use quest_common::rpc::{
    CreateTaskParams, DaemonStatus, ListTasksParams, RpcMethod, RpcRequest, RpcResponse,
    SelectAvatarParams, TaskIdParams, TaskResult, UpdateTaskParams,
};
use quest_common::QuestError;

use crate::engine;
use crate::state::SharedState;
use crate::sweep;

fn parse_params<T: serde::de::DeserializeOwned>(
    id: &str,
    params: Option<serde_json::Value>,
) -> Result<T, RpcResponse> {
    match params {
        Some(value) => serde_json::from_value(value).map_err(|e| {
            RpcResponse::error(id.to_string(), -32602, format!("Invalid params: {}", e))
        }),
        None => Err(RpcResponse::error(id.to_string(), -32602, "Missing params".to_string())),
    }
}

fn success<T: serde::Serialize>(id: String, value: &T) -> RpcResponse {
    match serde_json::to_value(value) {
        Ok(v) => RpcResponse::success(id, v),
        Err(e) => RpcResponse::error(id, -32603, format!("Serialization error: {}", e)),
    }
}

fn failure(id: String, e: QuestError) -> RpcResponse {
    RpcResponse::error(id, e.code(), e.to_string())
}

/// Handle one decoded request.
pub async fn dispatch(state: &SharedState, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let user = state.config.default_user;
    let now = Utc::now();
    let store = &state.store;

    match request.method {
        RpcMethod::Status => {
            let pending = match store.count_pending(user) {
                Ok(n) => n,
                Err(e) => {
                    warn!("pending task count unavailable: {}", e);
                    0
                }
            };
            let status = DaemonStatus {
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_seconds: state.start_time.elapsed().as_secs(),
                pending_tasks: pending,
                sweep_interval_secs: state.config.sweep_interval_secs,
            };
            success(id, &status)
        }

        RpcMethod::CreateTask => {
            let params: CreateTaskParams = match parse_params(&id, request.params) {
                Ok(p) => p,
                Err(resp) => return resp,
            };
            let task = engine::new_task(user, params, now);
            match store.create_task(&task) {
                Ok(()) => {
                    info!("task created: {} ({} XP)", task.id, task.points);
                    success(id, &TaskResult { task })
                }
                Err(e) => failure(id, e),
            }
        }

        RpcMethod::ListTasks => {
            let params: ListTasksParams = match request.params {
                Some(value) => match serde_json::from_value(value) {
                    Ok(p) => p,
                    Err(e) => return RpcResponse::error(id, -32602, format!("Invalid params: {}", e)),
                },
                None => ListTasksParams::default(),
            };
            match store.list_tasks(user, params.filter, now) {
                Ok(tasks) => success(id, &json!({ "tasks": tasks })),
                Err(e) => failure(id, e),
            }
        }

        RpcMethod::UpdateTask => {
            let params: UpdateTaskParams = match parse_params(&id, request.params) {
                Ok(p) => p,
                Err(resp) => return resp,
            };
            match store.update_task(user, &params) {
                Ok(task) => success(id, &TaskResult { task }),
                Err(e) => failure(id, e),
            }
        }

        RpcMethod::DeleteTask => {
            let params: TaskIdParams = match parse_params(&id, request.params) {
                Ok(p) => p,
                Err(resp) => return resp,
            };
            match store.delete_task(user, params.id) {
                Ok(()) => success(id, &json!({ "deleted": params.id })),
                Err(e) => failure(id, e),
            }
        }

        RpcMethod::CompleteTask => {
            let params: TaskIdParams = match parse_params(&id, request.params) {
                Ok(p) => p,
                Err(resp) => return resp,
            };
            match engine::complete_task(store, user, params.id, now) {
                Ok(result) => success(id, &result),
                Err(e) => failure(id, e),
            }
        }

        RpcMethod::Profile => match engine::profile_view(store, user) {
            Ok(view) => success(id, &view),
            Err(e) => failure(id, e),
        },

        RpcMethod::ClaimDaily => match engine::claim_daily(store, user, now) {
            Ok(result) => success(id, &result),
            Err(e) => failure(id, e),
        },

        RpcMethod::Badges => match engine::badges_view(store, user, now) {
            Ok(badges) => success(id, &json!({ "badges": badges })),
            Err(e) => failure(id, e),
        },

        RpcMethod::Avatars => match engine::avatars_view(store, user, now) {
            Ok(avatars) => success(id, &json!({ "avatars": avatars })),
            Err(e) => failure(id, e),
        },

        RpcMethod::SelectAvatar => {
            let params: SelectAvatarParams = match parse_params(&id, request.params) {
                Ok(p) => p,
                Err(resp) => return resp,
            };
            match engine::select_avatar(store, user, &params.id, now) {
                Ok(profile) => success(id, &json!({ "selected": profile.selected_avatar_id })),
                Err(e) => failure(id, e),
            }
        }

        RpcMethod::Challenges => match engine::challenges_view(store, user) {
            Ok(challenges) => success(id, &json!({ "challenges": challenges })),
            Err(e) => failure(id, e),
        },

        RpcMethod::Sweep => {
            let report = sweep::run_sweep(store, now);
            success(id, &report)
        }
    }
}
