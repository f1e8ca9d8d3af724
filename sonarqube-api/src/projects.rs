//! Projects API: confirmation that an analysis has been registered for a project.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{SonarClient, SonarError};

/// A single analysis entry of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub key: String,
    pub date: Option<String>,
}

/// Paging block common to search endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_index: u32,
    pub page_size: u32,
    pub total: u32,
}

/// Response of `GET /api/project_analyses/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalyses {
    #[serde(default)]
    pub paging: Paging,
    #[serde(default)]
    pub analyses: Vec<Analysis>,
}

impl ProjectAnalyses {
    /// Check if the backend knows at least one analysis for the project
    #[must_use]
    pub fn is_registered(&self) -> bool {
        !self.analyses.is_empty()
    }
}

/// Projects API client
pub struct ProjectsApi<'a> {
    client: &'a SonarClient,
}

impl<'a> ProjectsApi<'a> {
    #[must_use]
    pub fn new(client: &'a SonarClient) -> Self {
        Self { client }
    }

    /// Look up the analyses recorded for a project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status (404 when the
    /// project does not exist) or a malformed body.
    pub async fn analyses(&self, project_key: &str) -> Result<ProjectAnalyses, SonarError> {
        let response = self
            .client
            .get_with_query(
                "/api/project_analyses/search",
                &[("project", project_key), ("ps", "1")],
            )
            .await?;
        SonarClient::read_json(response, Cow::Borrowed("project lookup")).await
    }
}
