//! Database row models

pub mod execution;
pub mod workflow;

pub use execution::{ExecutionRecord, StatusEvent};
pub use workflow::{Workflow, WorkflowTask};
