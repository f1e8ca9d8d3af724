//! Core SonarQube API client implementation.
//!
//! This module contains the foundational client for making requests to the
//! SonarQube Web API, including basic authentication and response handling.

use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

use crate::{
    CeApi, MeasuresApi, PluginsApi, ProjectsApi, SonarConfig, SonarError, SystemApi, TokensApi,
};

/// Core SonarQube API client.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct SonarClient {
    config: SonarConfig,
    client: Client,
}

impl SonarClient {
    /// Create a new SonarQube API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(config: SonarConfig) -> Result<Self, SonarError> {
        Url::parse(&config.base_url).map_err(|e| {
            SonarError::InvalidConfig(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;

        let mut client_builder = Client::builder();

        if !config.validate_certificates {
            client_builder = client_builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        client_builder = client_builder
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.request_timeout));

        let client = client_builder.build().map_err(SonarError::Http)?;
        Ok(Self { config, client })
    }

    /// Build URL with query parameters - centralized helper
    pub(crate) fn build_url_with_params(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> String {
        let estimated_capacity = self
            .config
            .base_url
            .len()
            .saturating_add(endpoint.len())
            .saturating_add(query_params.len().saturating_mul(32));

        let mut url = String::with_capacity(estimated_capacity);
        url.push_str(&self.config.base_url);
        url.push_str(endpoint);

        if !query_params.is_empty() {
            url.push('?');
            for (i, (key, value)) in query_params.iter().enumerate() {
                if i > 0 {
                    url.push('&');
                }
                url.push_str(&urlencoding::encode(key));
                url.push('=');
                url.push_str(&urlencoding::encode(value));
            }
        }

        url
    }

    /// Unauthenticated GET, used for the health endpoint.
    pub(crate) async fn get_anonymous(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, SonarError> {
        let url = self.build_url_with_params(endpoint, query_params);
        debug!("🌐 GET {url}");
        Ok(self.client.get(&url).send().await?)
    }

    /// GET with basic authentication.
    pub(crate) async fn get_with_query(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, SonarError> {
        let url = self.build_url_with_params(endpoint, query_params);
        debug!("🌐 GET {url}");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(self.config.password.as_str()))
            .send()
            .await?;
        Ok(response)
    }

    /// Form-encoded POST with basic authentication.
    pub(crate) async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<Response, SonarError> {
        let url = self.build_url_with_params(endpoint, &[]);
        debug!("🌐 POST {url}");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(self.config.password.as_str()))
            .form(form)
            .send()
            .await?;
        Ok(response)
    }

    /// Read the body of a successful response, or convert a failed one into an error.
    pub(crate) async fn read_body(
        response: Response,
        operation: Cow<'_, str>,
    ) -> Result<String, SonarError> {
        let status = response.status();
        let body = response.text().await?;
        debug!("📥 {operation}: HTTP {status} ({} bytes)", body.len());

        if status.is_success() {
            return Ok(body);
        }

        Err(Self::status_error(status, &operation, body))
    }

    /// Read and deserialize the body of a successful response.
    pub(crate) async fn read_json<T>(
        response: Response,
        operation: Cow<'_, str>,
    ) -> Result<T, SonarError>
    where
        T: DeserializeOwned,
    {
        let body = Self::read_body(response, operation.clone()).await?;
        serde_json::from_str::<T>(&body)
            .map_err(|e| SonarError::InvalidResponse(format!("{operation}: {e}")))
    }

    fn status_error(status: StatusCode, operation: &str, body: String) -> SonarError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SonarError::Authentication(
                format!("{operation} rejected with HTTP {}: {body}", status.as_u16()),
            ),
            _ => SonarError::UnexpectedStatus {
                status: status.as_u16(),
                message: body,
            },
        }
    }

    /// Get a system API instance (health/status).
    pub fn system_api(&self) -> SystemApi<'_> {
        SystemApi::new(self)
    }

    /// Get a user tokens API instance.
    pub fn tokens_api(&self) -> TokensApi<'_> {
        TokensApi::new(self)
    }

    /// Get a compute engine API instance.
    pub fn ce_api(&self) -> CeApi<'_> {
        CeApi::new(self)
    }

    /// Get a projects API instance.
    pub fn projects_api(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    /// Get a plugins API instance.
    pub fn plugins_api(&self) -> PluginsApi<'_> {
        PluginsApi::new(self)
    }

    /// Get a measures API instance.
    pub fn measures_api(&self) -> MeasuresApi<'_> {
        MeasuresApi::new(self)
    }
}
