//! Core types for xunlei-client

use crate::filter::FileFilter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upstream identifier of a download task
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upstream task lifecycle label
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPhase {
    /// Waiting to start
    Pending,
    /// Downloading
    Running,
    /// Paused by user
    Paused,
    /// Failed upstream
    Error,
    /// Finished
    Complete,
    /// Any label this crate does not know yet
    Other(String),
}

impl TaskPhase {
    /// Phases that count as "not yet completed" when listing tasks
    pub const UNCOMPLETED: [TaskPhase; 4] = [
        TaskPhase::Pending,
        TaskPhase::Running,
        TaskPhase::Paused,
        TaskPhase::Error,
    ];

    /// Parse an upstream label such as `PHASE_TYPE_RUNNING`
    pub fn from_upstream(label: &str) -> Self {
        match label {
            "PHASE_TYPE_PENDING" => TaskPhase::Pending,
            "PHASE_TYPE_RUNNING" => TaskPhase::Running,
            "PHASE_TYPE_PAUSED" => TaskPhase::Paused,
            "PHASE_TYPE_ERROR" => TaskPhase::Error,
            "PHASE_TYPE_COMPLETE" => TaskPhase::Complete,
            other => TaskPhase::Other(other.to_string()),
        }
    }

    /// The upstream label for this phase
    pub fn as_upstream(&self) -> &str {
        match self {
            TaskPhase::Pending => "PHASE_TYPE_PENDING",
            TaskPhase::Running => "PHASE_TYPE_RUNNING",
            TaskPhase::Paused => "PHASE_TYPE_PAUSED",
            TaskPhase::Error => "PHASE_TYPE_ERROR",
            TaskPhase::Complete => "PHASE_TYPE_COMPLETE",
            TaskPhase::Other(label) => label,
        }
    }
}

/// A submitted or historical download task, as reported by the panel
///
/// Tasks are only ever built from list responses and are never cached; call
/// the listing methods again for fresh state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Upstream task id (used by pause/resume/delete)
    pub id: TaskId,
    /// Display name; also the de-duplication key on submission
    pub name: String,
    /// File name (upstream reports the task name here)
    pub file_name: String,
    /// Total size in bytes
    pub file_size: u64,
    /// Progress percentage, 0-100 (0 when upstream omits it)
    pub progress: u8,
    /// Destination path on the NAS
    pub real_path: String,
    /// Current speed in bytes per second (0 when upstream omits it)
    pub speed: u64,
    /// Lifecycle phase
    pub phase: TaskPhase,
    /// When the task was created
    pub created_time: Option<DateTime<Utc>>,
    /// When the task was last updated
    pub updated_time: Option<DateTime<Utc>>,
    /// The raw upstream record, kept for fields this crate does not model
    pub origin: serde_json::Value,
}

/// One leaf file inside a resolved resource tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFile {
    /// Position of the file within the bundle (0 when upstream omits it)
    pub index: u64,
    /// File name
    pub file_name: String,
    /// Size in bytes
    pub file_size: u64,
}

/// A folder on the NAS
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Upstream folder id
    pub id: String,
    /// Folder name
    pub name: String,
}

/// Node of the resource tree the panel reports for a magnet link
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// A directory and everything beneath it
    Directory {
        /// Directory name
        name: String,
        /// Child resources in upstream order
        children: Vec<Resource>,
    },
    /// A downloadable file
    File {
        /// Declared file index (None when upstream omits it)
        index: Option<u64>,
        /// File name
        name: String,
        /// Size in bytes
        size: u64,
    },
}

impl Resource {
    /// Name of this node
    pub fn name(&self) -> &str {
        match self {
            Resource::Directory { name, .. } | Resource::File { name, .. } => name,
        }
    }
}

/// Metadata resolved for a magnet link
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Task name (the first root resource's name)
    pub task_name: String,
    /// File count declared by upstream, before any filtering
    pub file_count: u64,
    /// Root resources in upstream order
    pub resources: Vec<Resource>,
}

/// Result of a task submission attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Nothing was created (no resources, rejected, or an error occurred)
    Failed,
    /// The task was created
    Created,
    /// A task with the same name already exists; nothing was submitted
    AlreadyExists,
}

impl SubmitOutcome {
    /// Numeric code: 0 = failed, 1 = created, 2 = already exists
    pub fn code(&self) -> u8 {
        match self {
            SubmitOutcome::Failed => 0,
            SubmitOutcome::Created => 1,
            SubmitOutcome::AlreadyExists => 2,
        }
    }

    /// True unless the submission failed
    pub fn is_ok(&self) -> bool {
        !matches!(self, SubmitOutcome::Failed)
    }
}

impl std::fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmitOutcome::Failed => "failed",
            SubmitOutcome::Created => "created",
            SubmitOutcome::AlreadyExists => "already exists",
        };
        f.write_str(s)
    }
}

/// Options for submitting a magnet link or torrent
#[derive(Clone, Default)]
pub struct SubmitOptions {
    /// Single-level folder to create under the root and download into
    pub sub_dir: Option<String>,
    /// Selects which of the bundle's files to download (all when None)
    pub filter: Option<Arc<dyn FileFilter>>,
}

impl SubmitOptions {
    /// Download into a new sub-folder of the root folder
    pub fn with_sub_dir(mut self, sub_dir: impl Into<String>) -> Self {
        self.sub_dir = Some(sub_dir.into());
        self
    }

    /// Only download the files the filter keeps
    pub fn with_filter(mut self, filter: impl FileFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// The sub-directory, if one was given and is non-empty
    pub fn sub_dir(&self) -> Option<&str> {
        self.sub_dir.as_deref().filter(|s| !s.is_empty())
    }
}

impl std::fmt::Debug for SubmitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitOptions")
            .field("sub_dir", &self.sub_dir)
            .field("filter", &self.filter.as_ref().map(|_| "<filter>"))
            .finish()
    }
}

/// Phase transition requested through the task patch endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskAction {
    /// Pause a running task
    Pause,
    /// Start or resume a task
    Resume,
    /// Delete a task
    Delete,
}

impl TaskAction {
    /// Phase value sent in the patch spec
    pub fn phase(&self) -> &'static str {
        match self {
            TaskAction::Pause => "pause",
            TaskAction::Resume => "running",
            TaskAction::Delete => "delete",
        }
    }
}
