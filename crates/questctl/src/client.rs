//! Unix socket client for communicating with questd.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use uuid::Uuid;

use quest_common::models::{Task, TaskFilter};
use quest_common::rpc::{
    AvatarStatus, BadgeStatus, ChallengeStatus, ClaimDailyResult, CompletionResult,
    CreateTaskParams, DaemonStatus, ProfileView, RpcMethod, RpcRequest, RpcResponse, SweepReport,
    TaskResult, UpdateTaskParams,
};
use quest_common::{SOCKET_ENV, SOCKET_PATH};

/// Client for communicating with questd. Holds the read half behind one
/// buffered reader for the connection's lifetime, so bytes buffered past a
/// response line are not lost between calls.
pub struct QuestdClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl QuestdClient {
    /// Resolve the socket path: flag > $QUESTD_SOCKET > default.
    pub fn socket_path(flag: Option<&str>) -> PathBuf {
        if let Some(path) = flag {
            return PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(SOCKET_ENV) {
            return PathBuf::from(path);
        }
        PathBuf::from(SOCKET_PATH)
    }

    /// Connect to questd
    pub async fn connect(socket: Option<&str>) -> Result<Self> {
        let socket_path = Self::socket_path(socket);

        if !Path::new(&socket_path).exists() {
            return Err(anyhow!(
                "Questline daemon not running.\n\
                 The socket at {} does not exist.\n\
                 Start it with: questd",
                socket_path.display()
            ));
        }

        let stream = UnixStream::connect(&socket_path)
            .await
            .map_err(|e| anyhow!("Cannot connect to questd: {}", e))?;

        let (reader, writer) = stream.into_split();
        Ok(Self { reader: BufReader::new(reader), writer })
    }

    /// Send an RPC request and get the decoded result.
    pub async fn call(
        &mut self,
        method: RpcMethod,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let request = RpcRequest::new(method, params);
        let request_json = serde_json::to_string(&request)?;

        self.writer
            .write_all(format!("{}\n", request_json).as_bytes())
            .await?;

        let mut line = String::new();
        self.reader.read_line(&mut line).await?;

        let response: RpcResponse = serde_json::from_str(&line)?;
        if let Some(error) = response.error {
            return Err(anyhow!("{}", error.message));
        }
        response.result.ok_or_else(|| anyhow!("No result in response"))
    }

    pub async fn status(&mut self) -> Result<DaemonStatus> {
        let result = self.call(RpcMethod::Status, None).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn create_task(&mut self, params: CreateTaskParams) -> Result<Task> {
        let result = self
            .call(RpcMethod::CreateTask, Some(serde_json::to_value(params)?))
            .await?;
        let task: TaskResult = serde_json::from_value(result)?;
        Ok(task.task)
    }

    pub async fn list_tasks(&mut self, filter: TaskFilter) -> Result<Vec<Task>> {
        let result = self
            .call(RpcMethod::ListTasks, Some(json!({ "filter": filter })))
            .await?;
        let tasks = result
            .get("tasks")
            .cloned()
            .ok_or_else(|| anyhow!("Malformed response"))?;
        Ok(serde_json::from_value(tasks)?)
    }

    pub async fn update_task(&mut self, params: UpdateTaskParams) -> Result<Task> {
        let result = self
            .call(RpcMethod::UpdateTask, Some(serde_json::to_value(params)?))
            .await?;
        let task: TaskResult = serde_json::from_value(result)?;
        Ok(task.task)
    }

    pub async fn delete_task(&mut self, id: Uuid) -> Result<()> {
        self.call(RpcMethod::DeleteTask, Some(json!({ "id": id }))).await?;
        Ok(())
    }

    pub async fn complete_task(&mut self, id: Uuid) -> Result<CompletionResult> {
        let result = self
            .call(RpcMethod::CompleteTask, Some(json!({ "id": id })))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn profile(&mut self) -> Result<ProfileView> {
        let result = self.call(RpcMethod::Profile, None).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn claim_daily(&mut self) -> Result<ClaimDailyResult> {
        let result = self.call(RpcMethod::ClaimDaily, None).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn badges(&mut self) -> Result<Vec<BadgeStatus>> {
        let result = self.call(RpcMethod::Badges, None).await?;
        let badges = result
            .get("badges")
            .cloned()
            .ok_or_else(|| anyhow!("Malformed response"))?;
        Ok(serde_json::from_value(badges)?)
    }

    pub async fn avatars(&mut self) -> Result<Vec<AvatarStatus>> {
        let result = self.call(RpcMethod::Avatars, None).await?;
        let avatars = result
            .get("avatars")
            .cloned()
            .ok_or_else(|| anyhow!("Malformed response"))?;
        Ok(serde_json::from_value(avatars)?)
    }

    pub async fn select_avatar(&mut self, id: &str) -> Result<()> {
        self.call(RpcMethod::SelectAvatar, Some(json!({ "id": id }))).await?;
        Ok(())
    }

    pub async fn challenges(&mut self) -> Result<Vec<ChallengeStatus>> {
        let result = self.call(RpcMethod::Challenges, None).await?;
        let challenges = result
            .get("challenges")
            .cloned()
            .ok_or_else(|| anyhow!("Malformed response"))?;
        Ok(serde_json::from_value(challenges)?)
    }

    pub async fn sweep(&mut self) -> Result<SweepReport> {
        let result = self.call(RpcMethod::Sweep, None).await?;
        Ok(serde_json::from_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UnixListener;

    #[test]
    fn test_socket_path_flag_wins() {
        let path = QuestdClient::socket_path(Some("/tmp/custom.sock"));
        assert_eq!(path, PathBuf::from("/tmp/custom.sock"));
    }

    #[tokio::test]
    async fn test_sequential_calls_share_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("questd.sock");
        let listener = UnixListener::bind(&socket).unwrap();

        // Echo server: one response line per request line, tagged in order.
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            let mut seq = 0;
            loop {
                line.clear();
                if reader.read_line(&mut line).await.unwrap() == 0 {
                    break;
                }
                let request: RpcRequest = serde_json::from_str(&line).unwrap();
                seq += 1;
                let response = RpcResponse::success(request.id, json!({ "seq": seq }));
                let payload = serde_json::to_string(&response).unwrap() + "\n";
                writer.write_all(payload.as_bytes()).await.unwrap();
            }
        });

        let flag = socket.to_string_lossy().to_string();
        let mut client = QuestdClient::connect(Some(flag.as_str())).await.unwrap();

        let first = client.call(RpcMethod::Status, None).await.unwrap();
        assert_eq!(first["seq"], 1);
        let second = client.call(RpcMethod::Status, None).await.unwrap();
        assert_eq!(second["seq"], 2);
    }
}
