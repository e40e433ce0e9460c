//! Cache-aside workflow definition provider
//!
//! Definitions are read-mostly: the engine consults an in-process cache
//! first and falls back to durable storage on a miss, repopulating the cache
//! with a bounded time-to-live. The external definition management service
//! calls `invalidate` on writes; a `get` racing an invalidation may still
//! return the just-fetched value, which is acceptable within one TTL window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::db::repositories::WorkflowRepository;
use crate::db::DatabasePool;
use crate::model::{ExecutionMode, TaskDefinition, WorkflowDefinition};
use crate::{EngineError, Result};

/// Read access to immutable workflow definition snapshots
#[async_trait]
pub trait DefinitionProvider: Send + Sync {
    /// Fetch the definition for a workflow identifier.
    ///
    /// Fails with `WorkflowNotFound` if no such workflow exists (a workflow
    /// without tasks counts as absent) and `Unavailable` if neither cache
    /// nor durable storage can serve the read.
    async fn get(&self, workflow_id: &str) -> Result<Arc<WorkflowDefinition>>;

    /// Drop any cached entry for the identifier. Idempotent; safe under
    /// concurrent `get` calls.
    fn invalidate(&self, workflow_id: &str);
}

struct CacheEntry {
    definition: Arc<WorkflowDefinition>,
    expires_at: Instant,
}

/// Definition provider backed by durable storage with a TTL-bounded cache
pub struct CachedDefinitionProvider {
    pool: DatabasePool,
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl CachedDefinitionProvider {
    pub fn new(pool: DatabasePool, ttl: Duration) -> Self {
        Self {
            pool,
            cache: DashMap::new(),
            ttl,
        }
    }

    async fn load_from_store(&self, workflow_id: &str) -> Result<Arc<WorkflowDefinition>> {
        let workflow = WorkflowRepository::get_by_id(&self.pool, workflow_id)
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;

        let rows = WorkflowRepository::tasks_for_workflow(&self.pool, workflow_id)
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        // A definition without tasks has nothing to execute
        if rows.is_empty() {
            return Err(EngineError::WorkflowNotFound(workflow_id.to_string()));
        }

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            let mode = ExecutionMode::parse(&row.execution_mode).ok_or_else(|| {
                EngineError::InvalidDefinition(format!(
                    "task {} has unknown execution mode '{}'",
                    row.id, row.execution_mode
                ))
            })?;

            tasks.push(TaskDefinition {
                id: row.id,
                name: row.name,
                sequence: row.sequence,
                mode,
            });
        }

        Ok(Arc::new(WorkflowDefinition {
            id: workflow.id,
            name: workflow.name,
            tasks,
        }))
    }
}

#[async_trait]
impl DefinitionProvider for CachedDefinitionProvider {
    async fn get(&self, workflow_id: &str) -> Result<Arc<WorkflowDefinition>> {
        if let Some(entry) = self.cache.get(workflow_id) {
            if entry.expires_at > Instant::now() {
                debug!("definition cache hit for workflow {}", workflow_id);
                return Ok(entry.definition.clone());
            }
        }

        debug!("definition cache miss for workflow {}", workflow_id);
        let definition = self.load_from_store(workflow_id).await?;

        self.cache.insert(
            workflow_id.to_string(),
            CacheEntry {
                definition: definition.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );

        Ok(definition)
    }

    fn invalidate(&self, workflow_id: &str) {
        if self.cache.remove(workflow_id).is_some() {
            debug!("invalidated cached definition for workflow {}", workflow_id);
        }
    }
}
