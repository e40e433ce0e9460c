//! Execution coordinator
//!
//! The per-run state machine: PENDING → RUNNING → {COMPLETED, FAILED}, with
//! CANCELLED reachable on an external cancellation request. Tasks are
//! partitioned into groups by ascending sequence value; within a group,
//! sync tasks run one at a time before the async members fan out and join.
//! A later group never starts before every task of the previous group has
//! reached a terminal outcome.
//!
//! Every transition is appended to the execution record store first and then
//! pushed to the status publisher, so a late reader can always recover the
//! latest state from the store even if it missed the live event.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::db::repositories::ExecutionRepository;
use crate::db::DatabasePool;
use crate::execution::publisher::StatusPublisher;
use crate::execution::runner::{run_bounded, TaskRunner};
use crate::model::{
    ExecutionMode, ExecutionStatus, ExecutionUpdateEvent, TaskDefinition, WorkflowDefinition,
};
use crate::Result;

/// Drives one workflow run at a time; executions are fully isolated from
/// one another, so any number of coordinators' runs proceed in parallel.
pub struct ExecutionCoordinator {
    pool: DatabasePool,
    publisher: Arc<StatusPublisher>,
    runner: Arc<dyn TaskRunner>,
    task_timeout: Duration,
}

impl ExecutionCoordinator {
    pub fn new(
        pool: DatabasePool,
        publisher: Arc<StatusPublisher>,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            pool,
            publisher,
            runner,
            task_timeout: Duration::from_secs(60),
        }
    }

    /// Set the per-task timeout
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Drive the run to a terminal status.
    ///
    /// The execution record must already exist (created by the caller so a
    /// pre-RUNNING failure is queryable). Internal errors are folded into a
    /// best-effort FAILED transition; they never escape to other runs.
    pub async fn run(
        &self,
        definition: Arc<WorkflowDefinition>,
        execution_id: String,
        cancel: CancellationToken,
    ) {
        if let Err(e) = self.drive(&definition, &execution_id, &cancel).await {
            error!("execution {} aborted internally: {}", execution_id, e);
            let event = ExecutionUpdateEvent::new(
                execution_id.clone(),
                definition.id.clone(),
                ExecutionStatus::Failed,
                format!("Internal error during execution: {}", e),
            );
            if let Err(store_err) =
                ExecutionRepository::append_status(&self.pool, &execution_id, &event).await
            {
                error!(
                    "failed to record FAILED status for execution {}: {}",
                    execution_id, store_err
                );
            }
            self.publisher.publish(&execution_id, event);
        }
    }

    async fn drive(
        &self,
        definition: &WorkflowDefinition,
        execution_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.emit(ExecutionUpdateEvent::new(
            execution_id,
            definition.id.clone(),
            ExecutionStatus::Pending,
            "Workflow execution initiated.",
        ))
        .await?;

        for (sequence, group) in group_by_sequence(&definition.tasks) {
            if cancel.is_cancelled() {
                return self.finish_cancelled(definition, execution_id).await;
            }

            info!(
                "execution {}: starting task group {} ({} tasks)",
                execution_id,
                sequence,
                group.len()
            );

            let (sync_tasks, async_tasks): (Vec<_>, Vec<_>) = group
                .into_iter()
                .partition(|task| task.mode == ExecutionMode::Sync);

            // Sync tasks run alone, one at a time
            for task in sync_tasks {
                self.emit(ExecutionUpdateEvent::for_task(
                    execution_id,
                    definition.id.clone(),
                    &task,
                    format!("Starting task {}", task.name),
                ))
                .await?;

                let outcome =
                    run_bounded(self.runner.clone(), task.clone(), self.task_timeout).await;
                if !outcome.succeeded {
                    return self
                        .finish_failed(definition, execution_id, &task, &outcome.detail)
                        .await;
                }
            }

            // Async tasks fan out together and the whole group joins
            if !async_tasks.is_empty() {
                for task in &async_tasks {
                    self.emit(ExecutionUpdateEvent::for_task(
                        execution_id,
                        definition.id.clone(),
                        task,
                        format!("Starting task {}", task.name),
                    ))
                    .await?;
                }

                let outcomes = join_all(async_tasks.iter().map(|task| {
                    run_bounded(self.runner.clone(), task.clone(), self.task_timeout)
                }))
                .await;

                if let Some((task, outcome)) = async_tasks
                    .iter()
                    .zip(outcomes.iter())
                    .find(|(_, outcome)| !outcome.succeeded)
                {
                    return self
                        .finish_failed(definition, execution_id, task, &outcome.detail)
                        .await;
                }
            }
        }

        if cancel.is_cancelled() {
            return self.finish_cancelled(definition, execution_id).await;
        }

        self.emit(ExecutionUpdateEvent::new(
            execution_id,
            definition.id.clone(),
            ExecutionStatus::Completed,
            "Workflow completed successfully.",
        ))
        .await?;

        info!("execution {} completed", execution_id);
        Ok(())
    }

    async fn finish_failed(
        &self,
        definition: &WorkflowDefinition,
        execution_id: &str,
        task: &TaskDefinition,
        detail: &str,
    ) -> Result<()> {
        warn!(
            "execution {} failed at task {}: {}",
            execution_id, task.id, detail
        );
        self.emit(ExecutionUpdateEvent::new(
            execution_id,
            definition.id.clone(),
            ExecutionStatus::Failed,
            format!("Workflow failed at task '{}': {}", task.name, detail),
        ))
        .await
    }

    async fn finish_cancelled(
        &self,
        definition: &WorkflowDefinition,
        execution_id: &str,
    ) -> Result<()> {
        info!("execution {} cancelled", execution_id);
        self.emit(ExecutionUpdateEvent::new(
            execution_id,
            definition.id.clone(),
            ExecutionStatus::Cancelled,
            "Workflow execution cancelled.",
        ))
        .await
    }

    /// Record the transition, then fan it out. Store before publisher, so
    /// the queryable snapshot is never behind the live stream.
    async fn emit(&self, event: ExecutionUpdateEvent) -> Result<()> {
        ExecutionRepository::append_status(&self.pool, &event.execution_id, &event).await?;
        let execution_id = event.execution_id.clone();
        self.publisher.publish(&execution_id, event);
        Ok(())
    }
}

/// Partition tasks into ordered groups by ascending sequence value.
///
/// Input order within one sequence value is preserved (tasks arrive sorted
/// by (sequence, id) from the definition provider).
fn group_by_sequence(tasks: &[TaskDefinition]) -> BTreeMap<i64, Vec<TaskDefinition>> {
    let mut groups: BTreeMap<i64, Vec<TaskDefinition>> = BTreeMap::new();
    for task in tasks {
        groups.entry(task.sequence).or_default().push(task.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, sequence: i64, mode: ExecutionMode) -> TaskDefinition {
        TaskDefinition {
            id: id.to_string(),
            name: id.to_string(),
            sequence,
            mode,
        }
    }

    #[test]
    fn test_group_by_sequence_orders_groups() {
        let tasks = vec![
            task("t1", 1, ExecutionMode::Sync),
            task("t2", 3, ExecutionMode::Async),
            task("t3", 1, ExecutionMode::Async),
            task("t4", 2, ExecutionMode::Sync),
        ];

        let groups = group_by_sequence(&tasks);
        let sequences: Vec<i64> = groups.keys().copied().collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(groups[&1].len(), 2);
        assert_eq!(groups[&1][0].id, "t1");
        assert_eq!(groups[&1][1].id, "t3");
    }

    #[test]
    fn test_group_by_sequence_empty() {
        assert!(group_by_sequence(&[]).is_empty());
    }
}
