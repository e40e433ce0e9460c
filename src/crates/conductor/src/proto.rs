/// gRPC Protocol Buffer message definitions and service traits

pub mod workflows {
    use serde::{Deserialize, Serialize};

    pub mod workflow_execution_server {
        use tonic::async_trait;

        #[async_trait]
        pub trait WorkflowExecution: Send + Sync + 'static {
            type ExecuteWorkflowStream: futures::Stream<Item = Result<super::WorkflowExecutionUpdate, tonic::Status>>
                + Send
                + 'static;

            /// Start a workflow run and stream its status transitions.
            ///
            /// The stream is finite: it closes after the terminal update.
            async fn execute_workflow(
                &self,
                request: tonic::Request<super::ExecuteWorkflowRequest>,
            ) -> Result<tonic::Response<Self::ExecuteWorkflowStream>, tonic::Status>;

            /// Point-in-time snapshot of an execution, live or historical.
            async fn get_workflow_status(
                &self,
                request: tonic::Request<super::GetWorkflowStatusRequest>,
            ) -> Result<tonic::Response<super::WorkflowStatusResponse>, tonic::Status>;
        }
    }

    /// Execution status codes carried on the wire.
    ///
    /// `Unspecified` is the proto3 zero value; it never describes a real run.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[repr(i32)]
    pub enum ExecutionStatus {
        Unspecified = 0,
        Pending = 1,
        Running = 2,
        Completed = 3,
        Failed = 4,
        Cancelled = 5,
    }

    impl ExecutionStatus {
        pub fn from_i32(value: i32) -> Self {
            match value {
                1 => ExecutionStatus::Pending,
                2 => ExecutionStatus::Running,
                3 => ExecutionStatus::Completed,
                4 => ExecutionStatus::Failed,
                5 => ExecutionStatus::Cancelled,
                _ => ExecutionStatus::Unspecified,
            }
        }

        pub fn as_str_name(&self) -> &'static str {
            match self {
                ExecutionStatus::Unspecified => "STATUS_UNSPECIFIED",
                ExecutionStatus::Pending => "PENDING",
                ExecutionStatus::Running => "RUNNING",
                ExecutionStatus::Completed => "COMPLETED",
                ExecutionStatus::Failed => "FAILED",
                ExecutionStatus::Cancelled => "CANCELLED",
            }
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExecuteWorkflowRequest {
        pub workflow_id: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct WorkflowExecutionUpdate {
        pub execution_id: String,
        pub workflow_id: String,
        pub status: i32,
        /// Empty unless the update carries a running task
        pub current_task_id: String,
        pub current_task_name: String,
        pub message: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct GetWorkflowStatusRequest {
        pub execution_id: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct WorkflowStatusResponse {
        pub execution_id: String,
        pub workflow_id: String,
        pub status: i32,
        pub last_message: String,
    }
}
