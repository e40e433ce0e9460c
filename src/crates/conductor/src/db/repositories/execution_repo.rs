//! Execution record repository
//!
//! The durable, queryable store of execution run state. One head row per
//! run plus an append-only history of status transitions. `append_status`
//! updates both atomically; a single coordinator owns a given record for
//! the run's lifetime, so per-record updates never race.

use crate::db::connection::DatabasePool;
use crate::db::error::{DatabaseError, DbResult};
use crate::db::models::{ExecutionRecord, StatusEvent};
use crate::model::{ExecutionStatus, ExecutionUpdateEvent};
use chrono::Utc;
use uuid::Uuid;

/// Repository for execution records and their status history
pub struct ExecutionRepository;

impl ExecutionRepository {
    /// Create a fresh PENDING record with a generated execution identifier
    pub async fn create(pool: &DatabasePool, workflow_id: &str) -> DbResult<ExecutionRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let record = sqlx::query_as::<_, ExecutionRecord>(
            "INSERT INTO workflow_executions (id, workflow_id, status, last_message, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&id)
        .bind(workflow_id)
        .bind(ExecutionStatus::Pending.as_str())
        .bind("")
        .bind(&now)
        .bind(&now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Append a status transition to the history and update the head snapshot
    ///
    /// Both writes happen in one transaction so readers never observe a
    /// partial update. Fails with NotFound if the identifier is unknown.
    pub async fn append_status(
        pool: &DatabasePool,
        execution_id: &str,
        event: &ExecutionUpdateEvent,
    ) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE workflow_executions
             SET status = ?, current_task_id = ?, current_task_name = ?, last_message = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(event.status.as_str())
        .bind(&event.current_task_id)
        .bind(&event.current_task_name)
        .bind(&event.message)
        .bind(&now)
        .bind(execution_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::not_found(format!(
                "execution {}",
                execution_id
            )));
        }

        sqlx::query(
            "INSERT INTO execution_status_events
             (execution_id, status, current_task_id, current_task_name, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(execution_id)
        .bind(event.status.as_str())
        .bind(&event.current_task_id)
        .bind(&event.current_task_name)
        .bind(&event.message)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get the current head snapshot of an execution
    pub async fn get(pool: &DatabasePool, execution_id: &str) -> DbResult<Option<ExecutionRecord>> {
        let record = sqlx::query_as::<_, ExecutionRecord>(
            "SELECT * FROM workflow_executions WHERE id = ?",
        )
        .bind(execution_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Ordered status history of an execution
    pub async fn history(pool: &DatabasePool, execution_id: &str) -> DbResult<Vec<StatusEvent>> {
        let events = sqlx::query_as::<_, StatusEvent>(
            "SELECT * FROM execution_status_events WHERE execution_id = ? ORDER BY id",
        )
        .bind(execution_id)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Count execution records
    pub async fn count(pool: &DatabasePool) -> DbResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workflow_executions")
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }
}
