//! Workflow definition rows
//!
//! These rows are written by the external definition management service and
//! read-only inside the engine.
//!
//! # Timestamps
//! All timestamp fields are RFC3339 strings due to SQLite type limitations.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored workflow definition head
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workflow {
    /// Unique workflow identifier
    pub id: String,

    /// Workflow name
    pub name: String,

    /// Optional workflow description
    pub description: Option<String>,

    /// Creation timestamp (RFC3339 string)
    pub created_at: String,

    /// Last update timestamp (RFC3339 string)
    pub updated_at: String,
}

/// A stored task belonging to a workflow definition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowTask {
    /// Unique task identifier
    pub id: String,

    /// Owning workflow identifier
    pub workflow_id: String,

    /// Task name
    pub name: String,

    /// Relative ordering among sibling tasks
    pub sequence: i64,

    /// Execution mode: "sync" or "async"
    pub execution_mode: String,

    /// Creation timestamp (RFC3339 string)
    pub created_at: String,

    /// Last update timestamp (RFC3339 string)
    pub updated_at: String,
}
