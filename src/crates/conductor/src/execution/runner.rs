//! Task runner
//!
//! The extension point for actual task logic. The engine treats task bodies
//! as opaque: a runner is invoked with the task definition and must report a
//! terminal outcome. Concrete strategies (inline function, remote call,
//! subprocess) substitute here without touching the coordinator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::model::TaskDefinition;

/// Terminal outcome reported by a task runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub succeeded: bool,
    pub detail: String,
}

impl TaskOutcome {
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            detail: detail.into(),
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            detail: detail.into(),
        }
    }
}

/// Executes a single task unit
///
/// Runners never retry; retry policy, if any, belongs to the coordinator.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, task: &TaskDefinition) -> TaskOutcome;
}

/// Invoke a runner bounded by a per-task timeout, with panic isolation.
///
/// The task body runs in its own tokio task so a panic inside it is caught
/// at this boundary and converted into a failed outcome instead of tearing
/// down the coordinator. On timeout the body is aborted and the outcome is
/// `succeeded=false, detail="timeout"`.
pub async fn run_bounded(
    runner: Arc<dyn TaskRunner>,
    task: TaskDefinition,
    limit: Duration,
) -> TaskOutcome {
    let task_id = task.id.clone();
    let mut handle = tokio::spawn(async move { runner.run(&task).await });

    match tokio::time::timeout(limit, &mut handle).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_err)) => {
            if join_err.is_panic() {
                warn!("task {} panicked during execution", task_id);
                TaskOutcome::failure("task panicked")
            } else {
                TaskOutcome::failure("task aborted")
            }
        }
        Err(_) => {
            warn!("task {} exceeded its {:?} timeout", task_id, limit);
            handle.abort();
            TaskOutcome::failure("timeout")
        }
    }
}

/// Default runner used when no task-specific behavior is registered.
///
/// Reports a deterministic successful outcome after an optional simulated
/// work delay; it never silently no-ops.
pub struct SimulatedTaskRunner {
    delay: Duration,
}

impl SimulatedTaskRunner {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedTaskRunner {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

#[async_trait]
impl TaskRunner for SimulatedTaskRunner {
    async fn run(&self, task: &TaskDefinition) -> TaskOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        TaskOutcome::success(format!("Task {} completed successfully.", task.name))
    }
}
