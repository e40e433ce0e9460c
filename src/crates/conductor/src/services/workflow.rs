//! Workflow execution service
//!
//! Implements the streaming RPC surface: `ExecuteWorkflow` opens a long-lived
//! server-to-client stream that closes after the terminal status update, and
//! `GetWorkflowStatus` answers a point-in-time snapshot for any execution
//! ever created, live or historical.

use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use crate::config::EngineConfig;
use crate::db::repositories::ExecutionRepository;
use crate::db::DatabasePool;
use crate::definition::DefinitionProvider;
use crate::execution::coordinator::ExecutionCoordinator;
use crate::execution::publisher::StatusPublisher;
use crate::execution::runner::TaskRunner;
use crate::proto::workflows::{
    workflow_execution_server::WorkflowExecution, ExecuteWorkflowRequest,
    GetWorkflowStatusRequest, WorkflowExecutionUpdate, WorkflowStatusResponse,
};
use crate::proto_conv::{record_to_status_response, update_to_proto};

pub struct WorkflowExecutionService {
    pool: DatabasePool,
    provider: Arc<dyn DefinitionProvider>,
    publisher: Arc<StatusPublisher>,
    coordinator: Arc<ExecutionCoordinator>,
    cancellations: Arc<DashMap<String, CancellationToken>>,
}

impl WorkflowExecutionService {
    pub fn new(
        pool: DatabasePool,
        provider: Arc<dyn DefinitionProvider>,
        runner: Arc<dyn TaskRunner>,
        engine: &EngineConfig,
    ) -> Self {
        let publisher = Arc::new(StatusPublisher::new(engine.stream_buffer));
        let coordinator = Arc::new(
            ExecutionCoordinator::new(pool.clone(), publisher.clone(), runner)
                .with_task_timeout(engine.task_timeout()),
        );

        Self {
            pool,
            provider,
            publisher,
            coordinator,
            cancellations: Arc::new(DashMap::new()),
        }
    }

    /// Status stream publisher shared with the coordinator
    pub fn publisher(&self) -> &Arc<StatusPublisher> {
        &self.publisher
    }

    /// Request cooperative cancellation of a live run.
    ///
    /// The in-flight task group drains before the run transitions to
    /// CANCELLED; returns false if the run is unknown or already terminal.
    pub fn cancel(&self, execution_id: &str) -> bool {
        match self.cancellations.get(execution_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[tonic::async_trait]
impl WorkflowExecution for WorkflowExecutionService {
    type ExecuteWorkflowStream =
        Pin<Box<dyn futures::Stream<Item = Result<WorkflowExecutionUpdate, Status>> + Send>>;

    async fn execute_workflow(
        &self,
        request: Request<ExecuteWorkflowRequest>,
    ) -> Result<Response<Self::ExecuteWorkflowStream>, Status> {
        let req = request.into_inner();

        if req.workflow_id.is_empty() {
            return Err(Status::invalid_argument("Workflow ID is required"));
        }

        // Definition fetch comes first: an unknown workflow fails the RPC
        // and leaves no execution record behind
        let definition = self.provider.get(&req.workflow_id).await.map_err(|e| {
            tracing::warn!("definition fetch failed for {}: {}", req.workflow_id, e);
            Status::from(e)
        })?;

        let record = ExecutionRepository::create(&self.pool, &req.workflow_id)
            .await
            .map_err(|e| {
                tracing::error!("failed to create execution record: {}", e);
                Status::unavailable(format!("Failed to create execution record: {}", e))
            })?;
        let execution_id = record.id;

        // Register the stream before the coordinator starts so the caller
        // observes every transition from PENDING onward
        let rx = self.publisher.register(&execution_id);

        let cancel = CancellationToken::new();
        self.cancellations
            .insert(execution_id.clone(), cancel.clone());

        let coordinator = self.coordinator.clone();
        let cancellations = self.cancellations.clone();
        let run_id = execution_id.clone();
        tokio::spawn(async move {
            coordinator.run(definition, run_id.clone(), cancel).await;
            cancellations.remove(&run_id);
        });

        tracing::info!(
            "started execution {} for workflow {}",
            execution_id,
            req.workflow_id
        );

        Ok(Response::new(Box::pin(updates_stream(rx))))
    }

    async fn get_workflow_status(
        &self,
        request: Request<GetWorkflowStatusRequest>,
    ) -> Result<Response<WorkflowStatusResponse>, Status> {
        let req = request.into_inner();

        if req.execution_id.is_empty() {
            return Err(Status::invalid_argument("Execution ID is required"));
        }

        let record = ExecutionRepository::get(&self.pool, &req.execution_id)
            .await
            .map_err(|e| {
                tracing::error!("failed to read execution {}: {}", req.execution_id, e);
                Status::unavailable(format!("Failed to read execution record: {}", e))
            })?
            .ok_or_else(|| {
                Status::not_found(format!("Execution not found: {}", req.execution_id))
            })?;

        Ok(Response::new(record_to_status_response(&record)))
    }
}

/// Adapt a broadcast receiver into the finite RPC update stream.
///
/// Lagged gaps are skipped (drop-oldest backpressure policy); the stream
/// ends after the terminal update is yielded or the channel closes.
fn updates_stream(
    mut rx: broadcast::Receiver<crate::model::ExecutionUpdateEvent>,
) -> impl futures::Stream<Item = Result<WorkflowExecutionUpdate, Status>> {
    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let terminal = event.status.is_terminal();
                    yield Ok(update_to_proto(&event));
                    if terminal {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("status stream lagged, dropped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
