//! Workflow execution engine
//!
//! This crate drives stored workflow definitions through an execution
//! lifecycle: it fetches a definition snapshot, walks the task graph honoring
//! per-task sequencing and concurrency, persists a durable execution record,
//! and streams live status transitions to callers.

pub mod config;
pub mod db;
pub mod definition;
pub mod execution;
pub mod model;
pub mod proto;
pub mod proto_conv;
pub mod services;

use thiserror::Error;

use crate::db::DatabaseError;

/// Errors that can occur while driving a workflow execution
#[derive(Debug, Error)]
pub enum EngineError {
    /// No workflow definition with the given identifier
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    /// No execution record with the given identifier
    #[error("Execution not found: {0}")]
    ExecutionNotFound(String),

    /// A stored definition could not be interpreted
    #[error("Invalid workflow definition: {0}")]
    InvalidDefinition(String),

    /// Cache and durable storage are both unreachable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<DatabaseError> for EngineError {
    fn from(err: DatabaseError) -> Self {
        if err.is_not_found() {
            EngineError::ExecutionNotFound(err.to_string())
        } else {
            EngineError::Unavailable(err.to_string())
        }
    }
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::WorkflowNotFound(_) | EngineError::ExecutionNotFound(_) => {
                tonic::Status::not_found(err.to_string())
            }
            EngineError::InvalidDefinition(_) => {
                tonic::Status::failed_precondition(err.to_string())
            }
            EngineError::Unavailable(_) => tonic::Status::unavailable(err.to_string()),
            EngineError::Serialization(_) => tonic::Status::internal(err.to_string()),
        }
    }
}

pub use definition::{CachedDefinitionProvider, DefinitionProvider};
pub use execution::coordinator::ExecutionCoordinator;
pub use execution::publisher::StatusPublisher;
pub use execution::runner::{SimulatedTaskRunner, TaskOutcome, TaskRunner};
pub use model::{
    ExecutionMode, ExecutionStatus, ExecutionUpdateEvent, TaskDefinition, WorkflowDefinition,
};
pub use services::WorkflowExecutionService;

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_to_status() {
        let status: tonic::Status = EngineError::WorkflowNotFound("w1".to_string()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = EngineError::Unavailable("cache down".to_string()).into();
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }

    #[test]
    fn test_database_error_conversion() {
        let err: EngineError = DatabaseError::not_found("execution exec-1").into();
        assert!(matches!(err, EngineError::ExecutionNotFound(_)));

        let err: EngineError = DatabaseError::ConnectionError("refused".to_string()).into();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
