//! Repositories for database operations

pub mod execution_repo;
pub mod workflow_repo;

pub use execution_repo::ExecutionRepository;
pub use workflow_repo::WorkflowRepository;
