//! Completed / uncompleted task listings.

use crate::error::Result;
use crate::types::{Task, TaskId, TaskPhase};
use crate::utils::{de_string, de_timestamp, de_u64};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashSet;

use super::XunleiClient;

/// Task type for URL / magnet downloads
pub(crate) const TASK_TYPE_URL: &str = "user#download-url";
/// Task types included in listings
const LISTED_TASK_TYPES: &str = "user#download-url,user#download";
/// Upper bound on records per page
pub(crate) const TASK_PAGE_LIMIT: &str = "200";

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    #[serde(default)]
    tasks: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "de_string")]
    next_page_token: String,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default, deserialize_with = "de_string")]
    id: String,
    #[serde(default, deserialize_with = "de_string")]
    name: String,
    #[serde(default, deserialize_with = "de_u64")]
    file_size: u64,
    #[serde(default, deserialize_with = "de_u64")]
    progress: u64,
    #[serde(default, deserialize_with = "de_string")]
    phase: String,
    #[serde(default)]
    params: Option<RawTaskParams>,
    #[serde(default, deserialize_with = "de_timestamp")]
    created_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    updated_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTaskParams {
    #[serde(default, deserialize_with = "de_string")]
    real_path: String,
    #[serde(default, deserialize_with = "de_u64")]
    speed: u64,
}

/// Build the `filters` query value for a task listing
pub(crate) fn task_filters(phases: &[TaskPhase]) -> String {
    let phases = phases
        .iter()
        .map(TaskPhase::as_upstream)
        .collect::<Vec<_>>()
        .join(",");
    json!({
        "phase": { "in": phases },
        "type": { "in": LISTED_TASK_TYPES },
    })
    .to_string()
}

/// Map one raw upstream record into a [`Task`]
pub(crate) fn task_from_value(value: Value) -> Result<Task> {
    let raw: RawTask = serde_json::from_value(value.clone())?;
    let params = raw.params.unwrap_or_default();
    Ok(Task {
        id: TaskId(raw.id),
        file_name: raw.name.clone(),
        name: raw.name,
        file_size: raw.file_size,
        progress: raw.progress.min(100) as u8,
        real_path: params.real_path,
        speed: params.speed,
        phase: TaskPhase::from_upstream(&raw.phase),
        created_time: raw.created_time,
        updated_time: raw.updated_time,
        origin: value,
    })
}

impl XunleiClient {
    /// Tasks that finished downloading
    pub async fn completed_tasks(&mut self) -> Result<Vec<Task>> {
        self.list_tasks(&[TaskPhase::Complete]).await
    }

    /// Tasks that are pending, running, paused, or failed
    pub async fn uncompleted_tasks(&mut self) -> Result<Vec<Task>> {
        self.list_tasks(&TaskPhase::UNCOMPLETED).await
    }

    /// Names of every completed and uncompleted task
    pub(crate) async fn existing_task_names(&mut self) -> Result<HashSet<String>> {
        let mut names: HashSet<String> = self
            .completed_tasks()
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        names.extend(self.uncompleted_tasks().await?.into_iter().map(|t| t.name));
        Ok(names)
    }

    /// List URL/magnet tasks in the given phases, following page tokens
    pub async fn list_tasks(&mut self, phases: &[TaskPhase]) -> Result<Vec<Task>> {
        let device_id = self.device_id().await?;
        let filters = task_filters(phases);

        let mut tasks = Vec::new();
        let mut page_token = String::new();
        let mut seen_tokens = HashSet::new();

        loop {
            let query = [
                ("space", device_id.as_str()),
                ("page_token", page_token.as_str()),
                ("filters", filters.as_str()),
                ("limit", TASK_PAGE_LIMIT),
                ("device_space", ""),
            ];
            let data = self
                .request(Method::GET, "/drive/v1/tasks", &query, None)
                .await?;
            let page: TaskListResponse = serde_json::from_value(data)?;

            for value in page.tasks.unwrap_or_default() {
                tasks.push(task_from_value(value)?);
            }

            if page.next_page_token.is_empty() || !seen_tokens.insert(page.next_page_token.clone())
            {
                break;
            }
            page_token = page.next_page_token;
        }

        tracing::debug!(count = tasks.len(), filters = %filters, "listed tasks");
        Ok(tasks)
    }
}
