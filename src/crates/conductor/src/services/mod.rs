/// gRPC Service implementations for the execution engine

pub mod workflow;

pub use workflow::WorkflowExecutionService;
