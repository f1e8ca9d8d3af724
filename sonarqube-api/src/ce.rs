//! Compute Engine API: background analysis tasks.
//!
//! Every scanner submission creates a compute engine task on the backend. The
//! analysis report is only visible through the measures API once that task has
//! reached [`TaskStatus::Success`].

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{SonarClient, SonarError};

/// Compute engine task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    Canceled,
    /// Any status this client does not know about; treated as still running
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Check if the task completed successfully
    #[must_use]
    pub fn is_successful(&self) -> bool {
        matches!(self, TaskStatus::Success)
    }

    /// Check if the task failed or was terminated
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::Canceled)
    }

    /// Check if the task reached a state it will not leave
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_successful() || self.is_failed()
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Success => write!(f, "SUCCESS"),
            TaskStatus::Failed => write!(f, "FAILED"),
            TaskStatus::Canceled => write!(f, "CANCELED"),
            TaskStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A compute engine task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub component_key: Option<String>,
    pub status: TaskStatus,
    pub analysis_id: Option<String>,
    pub error_message: Option<String>,
    pub submitted_at: Option<String>,
    pub executed_at: Option<String>,
    pub execution_time_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    task: Task,
}

/// Parse a `GET /api/ce/task` body.
///
/// # Errors
///
/// Returns [`SonarError::InvalidResponse`] if the `task` object is missing or malformed.
pub fn parse_task(body: &str) -> Result<Task, SonarError> {
    serde_json::from_str::<TaskResponse>(body)
        .map(|response| response.task)
        .map_err(|e| SonarError::InvalidResponse(format!("Failed to parse task: {e}")))
}

/// Compute Engine API client
pub struct CeApi<'a> {
    client: &'a SonarClient,
}

impl<'a> CeApi<'a> {
    #[must_use]
    pub fn new(client: &'a SonarClient) -> Self {
        Self { client }
    }

    /// Get a task by id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or a malformed body.
    pub async fn task(&self, task_id: &str) -> Result<Task, SonarError> {
        let response = self
            .client
            .get_with_query("/api/ce/task", &[("id", task_id)])
            .await?;
        let body = SonarClient::read_body(response, Cow::Borrowed("task status")).await?;
        parse_task(&body)
    }
}
