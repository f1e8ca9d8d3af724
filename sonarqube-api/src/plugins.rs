//! Plugins API: which language plugins the backend has installed.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{SonarClient, SonarError};

/// An installed plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plugin {
    pub key: String,
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstalledPlugins {
    plugins: Vec<Plugin>,
}

/// Plugins API client
pub struct PluginsApi<'a> {
    client: &'a SonarClient,
}

impl<'a> PluginsApi<'a> {
    #[must_use]
    pub fn new(client: &'a SonarClient) -> Self {
        Self { client }
    }

    /// List installed plugins.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or a malformed body.
    pub async fn installed(&self) -> Result<Vec<Plugin>, SonarError> {
        let response = self
            .client
            .get_with_query("/api/plugins/installed", &[])
            .await?;
        let installed: InstalledPlugins =
            SonarClient::read_json(response, Cow::Borrowed("installed plugins")).await?;
        Ok(installed.plugins)
    }
}
