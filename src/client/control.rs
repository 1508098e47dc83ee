//! Task control: pause, resume, delete.

use crate::error::Result;
use crate::types::{TaskAction, TaskId};
use reqwest::Method;
use serde_json::{Value, json};

use super::tasks::TASK_TYPE_URL;
use super::XunleiClient;

impl XunleiClient {
    /// Pause a task
    ///
    /// Returns `true` when the panel accepted the request. Failures are logged,
    /// never raised.
    pub async fn pause(&mut self, id: &TaskId) -> bool {
        self.apply_action(id, TaskAction::Pause).await
    }

    /// Start or resume a task
    pub async fn resume(&mut self, id: &TaskId) -> bool {
        self.apply_action(id, TaskAction::Resume).await
    }

    /// Delete a task
    pub async fn delete(&mut self, id: &TaskId) -> bool {
        self.apply_action(id, TaskAction::Delete).await
    }

    /// Send a phase transition for one task; `true` iff `error_code` is 0 or absent
    pub async fn apply_action(&mut self, id: &TaskId, action: TaskAction) -> bool {
        tracing::info!(task_id = %id, action = action.phase(), "changing task phase");
        match self.patch_task_phase(id, action).await {
            Ok(result) => {
                let code = result.get("error_code").and_then(Value::as_i64).unwrap_or(0);
                if code == 0 {
                    tracing::info!(task_id = %id, action = action.phase(), "task phase changed");
                    true
                } else {
                    tracing::error!(
                        task_id = %id,
                        action = action.phase(),
                        error_code = code,
                        response = %result,
                        "task phase change rejected"
                    );
                    false
                }
            }
            Err(e) => {
                tracing::error!(task_id = %id, action = action.phase(), error = %e, "task phase change failed");
                false
            }
        }
    }

    async fn patch_task_phase(&mut self, id: &TaskId, action: TaskAction) -> Result<Value> {
        let device_id = self.device_id().await?;
        let token = self.auth_token().await;
        let spec = json!({ "phase": action.phase() }).to_string();
        let body = json!({
            "space": device_id,
            "type": TASK_TYPE_URL,
            "id": id.as_str(),
            "set_params": { "spec": spec },
        });

        self.request(
            Method::POST,
            "/method/patch/drive/v1/task",
            &[("pan_auth", token.as_str()), ("device_space", "")],
            Some(&body),
        )
        .await
    }
}
