//! Workflow definition repository (read-only)
//!
//! Definition CRUD lives in an external service; the engine only reads
//! definition rows when starting a run.

use crate::db::connection::DatabasePool;
use crate::db::error::DbResult;
use crate::db::models::{Workflow, WorkflowTask};

/// Read-side repository over workflow definition tables
pub struct WorkflowRepository;

impl WorkflowRepository {
    /// Get a workflow head by ID
    pub async fn get_by_id(pool: &DatabasePool, id: &str) -> DbResult<Option<Workflow>> {
        let workflow = sqlx::query_as::<_, Workflow>("SELECT * FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(workflow)
    }

    /// List a workflow's tasks ordered by (sequence, id)
    pub async fn tasks_for_workflow(
        pool: &DatabasePool,
        workflow_id: &str,
    ) -> DbResult<Vec<WorkflowTask>> {
        let tasks = sqlx::query_as::<_, WorkflowTask>(
            "SELECT * FROM workflow_tasks WHERE workflow_id = ? ORDER BY sequence, id",
        )
        .bind(workflow_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
