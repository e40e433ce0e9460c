//! Workflow execution
//!
//! The coordinator drives a run's state machine, the runner executes single
//! task units, and the publisher fans status transitions out to subscribers.

pub mod coordinator;
pub mod publisher;
pub mod runner;

pub use coordinator::ExecutionCoordinator;
pub use publisher::StatusPublisher;
pub use runner::{run_bounded, SimulatedTaskRunner, TaskOutcome, TaskRunner};
