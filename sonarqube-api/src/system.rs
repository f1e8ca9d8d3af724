//! System API: backend health and lifecycle status.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{SonarClient, SonarError};

/// Status value reported once the backend is fully started and accepting analyses
pub const READY_STATUS: &str = "UP";

/// Response of `GET /api/system/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Server id; absent while the server is still starting
    pub id: Option<String>,
    /// Server version
    pub version: Option<String>,
    /// One of STARTING, UP, DOWN, RESTARTING, DB_MIGRATION_NEEDED, DB_MIGRATION_RUNNING
    pub status: String,
}

impl SystemStatus {
    /// Check if the backend reports the ready sentinel
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status == READY_STATUS
    }
}

/// System API client
pub struct SystemApi<'a> {
    client: &'a SonarClient,
}

impl<'a> SystemApi<'a> {
    #[must_use]
    pub fn new(client: &'a SonarClient) -> Self {
        Self { client }
    }

    /// Fetch the backend status.
    ///
    /// The endpoint is unauthenticated. A non-200 answer is returned as
    /// [`SonarError::UnexpectedStatus`] so callers can log what they saw.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or an
    /// unparseable body.
    pub async fn status(&self) -> Result<SystemStatus, SonarError> {
        let response = self.client.get_anonymous("/api/system/status", &[]).await?;
        SonarClient::read_json(response, Cow::Borrowed("system status")).await
    }
}
