//! Domain model for workflow execution
//!
//! Definition types are immutable snapshots of stored workflow data; a run
//! always reflects the definition as it was at start time. Update events are
//! the transient snapshots emitted on every status transition.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Record created, no task started yet
    Pending,
    /// Tasks are being driven
    Running,
    /// Every task succeeded
    Completed,
    /// A task failed or an internal error aborted the run
    Failed,
    /// The run was cancelled cooperatively
    Cancelled,
}

impl ExecutionStatus {
    /// Stable string form used for persistence and the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "PENDING",
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Completed => "COMPLETED",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parse the stored string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(ExecutionStatus::Pending),
            "RUNNING" => Some(ExecutionStatus::Running),
            "COMPLETED" => Some(ExecutionStatus::Completed),
            "FAILED" => Some(ExecutionStatus::Failed),
            "CANCELLED" => Some(ExecutionStatus::Cancelled),
            _ => None,
        }
    }

    /// COMPLETED, FAILED and CANCELLED admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a task executes relative to its sequence-group siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Runs alone; never overlaps any other task's execution window
    Sync,
    /// Fans out concurrently with async siblings of the same sequence value
    Async,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sync => "sync",
            ExecutionMode::Async => "async",
        }
    }

    /// Parse the stored string form, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sync" => Some(ExecutionMode::Sync),
            "async" => Some(ExecutionMode::Async),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single task within a workflow definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Task identifier
    pub id: String,
    /// Human-readable task name
    pub name: String,
    /// Relative ordering among sibling tasks; equal values form one group
    pub sequence: i64,
    /// Execution mode within the group
    pub mode: ExecutionMode,
}

/// Immutable snapshot of a workflow and its ordered tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow identifier
    pub id: String,
    /// Workflow name
    pub name: String,
    /// Tasks ordered by (sequence, id)
    pub tasks: Vec<TaskDefinition>,
}

/// Snapshot emitted to subscribers on every status transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionUpdateEvent {
    pub execution_id: String,
    pub workflow_id: String,
    pub status: ExecutionStatus,
    /// Set only on RUNNING events carrying a task
    pub current_task_id: Option<String>,
    pub current_task_name: Option<String>,
    pub message: String,
}

impl ExecutionUpdateEvent {
    /// Event with no current task (PENDING and terminal transitions)
    pub fn new(
        execution_id: impl Into<String>,
        workflow_id: impl Into<String>,
        status: ExecutionStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            workflow_id: workflow_id.into(),
            status,
            current_task_id: None,
            current_task_name: None,
            message: message.into(),
        }
    }

    /// RUNNING event carrying the task about to execute
    pub fn for_task(
        execution_id: impl Into<String>,
        workflow_id: impl Into<String>,
        task: &TaskDefinition,
        message: impl Into<String>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            workflow_id: workflow_id.into(),
            status: ExecutionStatus::Running,
            current_task_id: Some(task.id.clone()),
            current_task_name: Some(task.name.clone()),
            message: message.into(),
        }
    }
}
