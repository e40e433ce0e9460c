/// Conversion functions between Protocol Buffer and domain models

use crate::db::models::ExecutionRecord;
use crate::model::{ExecutionStatus, ExecutionUpdateEvent};
use crate::proto::workflows;

/// Convert domain status to the wire enum value
pub fn status_to_proto(status: ExecutionStatus) -> workflows::ExecutionStatus {
    match status {
        ExecutionStatus::Pending => workflows::ExecutionStatus::Pending,
        ExecutionStatus::Running => workflows::ExecutionStatus::Running,
        ExecutionStatus::Completed => workflows::ExecutionStatus::Completed,
        ExecutionStatus::Failed => workflows::ExecutionStatus::Failed,
        ExecutionStatus::Cancelled => workflows::ExecutionStatus::Cancelled,
    }
}

/// Convert a stored status string to the wire enum value.
///
/// Unknown strings map to `Unspecified` rather than failing the read.
pub fn status_from_stored(status: &str) -> workflows::ExecutionStatus {
    ExecutionStatus::parse(status)
        .map(status_to_proto)
        .unwrap_or(workflows::ExecutionStatus::Unspecified)
}

/// Convert a domain update event to the wire update message
pub fn update_to_proto(event: &ExecutionUpdateEvent) -> workflows::WorkflowExecutionUpdate {
    workflows::WorkflowExecutionUpdate {
        execution_id: event.execution_id.clone(),
        workflow_id: event.workflow_id.clone(),
        status: status_to_proto(event.status) as i32,
        current_task_id: event.current_task_id.clone().unwrap_or_default(),
        current_task_name: event.current_task_name.clone().unwrap_or_default(),
        message: event.message.clone(),
    }
}

/// Convert an execution record head snapshot to the status response
pub fn record_to_status_response(record: &ExecutionRecord) -> workflows::WorkflowStatusResponse {
    workflows::WorkflowStatusResponse {
        execution_id: record.id.clone(),
        workflow_id: record.workflow_id.clone(),
        status: status_from_stored(&record.status) as i32,
        last_message: record.last_message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_to_proto_empty_task_fields() {
        let event = ExecutionUpdateEvent::new("e1", "w1", ExecutionStatus::Pending, "queued");
        let update = update_to_proto(&event);

        assert_eq!(update.status, workflows::ExecutionStatus::Pending as i32);
        assert!(update.current_task_id.is_empty());
        assert!(update.current_task_name.is_empty());
        assert_eq!(update.message, "queued");
    }

    #[test]
    fn test_status_from_stored_unknown() {
        assert_eq!(
            status_from_stored("RUNNING"),
            workflows::ExecutionStatus::Running
        );
        assert_eq!(
            status_from_stored("bogus"),
            workflows::ExecutionStatus::Unspecified
        );
    }
}
