//! Tracking the backend's asynchronous analysis task.

use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;
use sonarqube_api::TaskStatus;
use std::sync::LazyLock;
use std::time::Duration;

use crate::backend::Backend;
use crate::poll::{PollPolicy, Sleeper};
use crate::process::CommandOutput;

/// Task URL the scanner prints after uploading its report
static TASK_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"api/ce/task\?id=([A-Za-z0-9_\-]+)").expect("valid task id regex pattern")
});

/// Error types for task tracking
#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error("Analysis task {task_id} ended with status {status}: {message}")]
    Failed {
        task_id: String,
        status: TaskStatus,
        message: String,
    },

    #[error("Analysis task {task_id} did not finish after {attempts} attempts (last status: {last_status})")]
    Exhausted {
        task_id: String,
        attempts: u32,
        last_status: String,
    },
}

/// How the tracking phase ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrackOutcome {
    /// The task reached `SUCCESS`
    Completed { task_id: String, attempts: u32 },
    /// No task id was found; the grace period was waited instead
    Untracked,
}

/// Find the compute engine task id in captured scanner output.
///
/// stdout is searched first; stderr only when stdout has no match.
#[must_use]
pub fn extract_task_id(stdout: &str, stderr: &str) -> Option<String> {
    [stdout, stderr].into_iter().find_map(|stream| {
        TASK_ID_PATTERN
            .captures(stream)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Polls the task referenced by the scanner output until it reaches a terminal state
pub struct TaskTracker<'a, B, S> {
    backend: &'a B,
    sleeper: &'a S,
    policy: PollPolicy,
    fallback_delay: Duration,
}

impl<'a, B: Backend, S: Sleeper> TaskTracker<'a, B, S> {
    pub fn new(backend: &'a B, sleeper: &'a S, policy: PollPolicy, fallback_delay: Duration) -> Self {
        Self {
            backend,
            sleeper,
            policy,
            fallback_delay,
        }
    }

    /// Track the task announced in the scanner output.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Failed`] when the backend reports `FAILED` or
    /// `CANCELED`, and [`TaskError::Exhausted`] when the attempt budget runs out.
    pub async fn track(
        &self,
        scan_output: &CommandOutput,
        project_key: &str,
    ) -> Result<TrackOutcome, TaskError> {
        match extract_task_id(&scan_output.stdout, &scan_output.stderr) {
            Some(task_id) => self.poll(&task_id, project_key).await,
            None => {
                warn!(
                    "⚠️  No analysis task id found in scanner output, waiting {:?} before collecting metrics",
                    self.fallback_delay
                );
                self.sleeper.sleep(self.fallback_delay).await;
                Ok(TrackOutcome::Untracked)
            }
        }
    }

    /// Poll a known task id.
    ///
    /// # Errors
    ///
    /// See [`TaskTracker::track`].
    pub async fn poll(&self, task_id: &str, project_key: &str) -> Result<TrackOutcome, TaskError> {
        info!("⏳ Waiting for analysis task {task_id}");
        let mut last_status = "unknown".to_string();
        let mut attempt = 0;

        while self.policy.has_attempts_left(attempt) {
            attempt += 1;

            match self.backend.task(task_id).await {
                Ok(task) if task.status.is_successful() => {
                    info!(
                        "✅ Analysis task {task_id} succeeded (attempt {attempt}/{})",
                        self.policy.max_attempts
                    );
                    self.confirm(project_key).await;
                    return Ok(TrackOutcome::Completed {
                        task_id: task_id.to_string(),
                        attempts: attempt,
                    });
                }
                Ok(task) if task.status.is_failed() => {
                    let message = task
                        .error_message
                        .unwrap_or_else(|| "no error message reported".to_string());
                    return Err(TaskError::Failed {
                        task_id: task_id.to_string(),
                        status: task.status,
                        message,
                    });
                }
                Ok(task) => {
                    info!(
                        "   Task status is {} (attempt {attempt}/{})",
                        task.status, self.policy.max_attempts
                    );
                    last_status = task.status.to_string();
                }
                Err(e) => {
                    warn!(
                        "⚠️  Task lookup failed (attempt {attempt}/{}): {e}",
                        self.policy.max_attempts
                    );
                    last_status = format!("error: {e}");
                }
            }

            if self.policy.has_attempts_left(attempt) {
                self.sleeper.sleep(self.policy.delay_after(attempt)).await;
            }
        }

        Err(TaskError::Exhausted {
            task_id: task_id.to_string(),
            attempts: attempt,
            last_status,
        })
    }

    /// Single lookup of the project's analyses; discrepancies are only logged.
    async fn confirm(&self, project_key: &str) {
        match self.backend.project_analyses(project_key).await {
            Ok(analyses) if analyses.is_registered() => {
                debug!("   Project '{project_key}' has a registered analysis");
            }
            Ok(_) => warn!("⚠️  Task succeeded but no analysis is listed for '{project_key}'"),
            Err(e) => warn!("⚠️  Could not confirm analysis for '{project_key}': {e}"),
        }
    }
}
