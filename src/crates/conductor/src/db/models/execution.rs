//! Execution record rows
//!
//! `ExecutionRecord` is the queryable head snapshot of one workflow run;
//! `StatusEvent` rows form its append-only status history. Both are owned
//! exclusively by the coordinator driving the run, and become read-only once
//! a terminal status is reached.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Head snapshot of a workflow execution
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExecutionRecord {
    /// Generated execution identifier (UUID string)
    pub id: String,

    /// Identifier of the workflow definition this run was started from
    pub workflow_id: String,

    /// Current status: PENDING, RUNNING, COMPLETED, FAILED, CANCELLED
    pub status: String,

    /// Identifier of the task currently running, if any
    pub current_task_id: Option<String>,

    /// Name of the task currently running, if any
    pub current_task_name: Option<String>,

    /// Message carried by the most recent transition
    pub last_message: String,

    /// Record creation timestamp (RFC3339 string)
    pub created_at: String,

    /// Last transition timestamp (RFC3339 string)
    pub updated_at: String,
}

/// One appended status transition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusEvent {
    /// Monotonic row identifier; history order
    pub id: i64,

    /// Owning execution identifier
    pub execution_id: String,

    /// Status at this transition
    pub status: String,

    /// Task carried by the transition, if any
    pub current_task_id: Option<String>,

    /// Task name carried by the transition, if any
    pub current_task_name: Option<String>,

    /// Transition message
    pub message: String,

    /// Transition timestamp (RFC3339 string)
    pub created_at: String,
}
