//! # SonarQube API Client Library
//!
//! An async Rust client for the parts of the SonarQube Web API needed to drive an
//! automated analysis run: backend health, user token issuance, compute engine task
//! tracking, project analysis lookup, installed plugins and component measures.
//!
//! ## Features
//!
//! - 🔐 **Basic Authentication** - Username/password credentials on every authenticated call
//! - 🩺 **System API** - Health endpoint for readiness checks (unauthenticated)
//! - 🎟️ **User Tokens API** - Generate and revoke short-lived analysis tokens
//! - ⚙️ **Compute Engine API** - Poll background analysis tasks until they finish
//! - 📊 **Measures API** - Fetch metric values for an analyzed component
//! - 🚀 **Async/Await** - Built on tokio and reqwest
//!
//! ## Quick Start
//!
//! ```no_run
//! use sonarqube_api::{SonarClient, SonarConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SonarConfig::new(
//!         "http://localhost:9000".to_string(),
//!         "admin".to_string(),
//!         "admin".to_string(),
//!     );
//!
//!     let client = SonarClient::new(config)?;
//!
//!     let status = client.system_api().status().await?;
//!     println!("backend status: {}", status.status);
//!
//!     let measures = client
//!         .measures_api()
//!         .component("my-project", &["bugs".to_string(), "coverage".to_string()])
//!         .await?;
//!     println!("{} measures", measures.component.measures.len());
//!
//!     Ok(())
//! }
//! ```

pub mod ce;
pub mod client;
pub mod measures;
pub mod plugins;
pub mod projects;
pub mod system;
pub mod tokens;

pub use ce::{CeApi, Task, TaskStatus, parse_task};
pub use client::SonarClient;
pub use measures::{
    Component, ComponentMeasures, Measure, MeasuresApi, PeriodValue, parse_component_measures,
};
pub use plugins::{Plugin, PluginsApi};
pub use projects::{Analysis, Paging, ProjectAnalyses, ProjectsApi};
pub use system::{READY_STATUS, SystemApi, SystemStatus};
pub use tokens::{TokensApi, UserToken};

/// Error type for SonarQube API operations.
#[derive(Debug, thiserror::Error)]
pub enum SonarError {
    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The backend rejected the supplied credentials
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// The backend answered with a non-success status code
    #[error("Unexpected HTTP status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Secure wrapper for the backend password that redacts the value in debug output
#[derive(Clone)]
pub struct SecurePassword(String);

impl SecurePassword {
    pub fn new(password: String) -> Self {
        SecurePassword(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecurePassword {
    fn from(password: String) -> Self {
        SecurePassword(password)
    }
}

impl From<&str> for SecurePassword {
    fn from(password: &str) -> Self {
        SecurePassword(password.into())
    }
}

impl std::fmt::Debug for SecurePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Configuration for the SonarQube API client.
#[derive(Debug, Clone)]
pub struct SonarConfig {
    /// Base URL of the backend as seen from this process (no trailing slash)
    pub base_url: String,
    /// Login used for basic authentication
    pub username: String,
    /// Password used for basic authentication
    pub password: SecurePassword,
    /// TCP connect timeout in seconds
    pub connect_timeout: u64,
    /// Whole-request timeout in seconds
    pub request_timeout: u64,
    /// Whether to validate TLS certificates (default: true)
    pub validate_certificates: bool,
}

impl SonarConfig {
    /// Create a new configuration with default timeouts.
    ///
    /// Trailing slashes are stripped from `base_url` so endpoint paths can be
    /// appended directly.
    pub fn new(base_url: String, username: String, password: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password: SecurePassword::new(password),
            connect_timeout: 10,
            request_timeout: 30,
            validate_certificates: true,
        }
    }

    /// Set the connect timeout in seconds.
    #[must_use]
    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = seconds;
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    /// Disable certificate validation for development environments.
    ///
    /// WARNING: This should only be used with self-signed local backends.
    #[must_use]
    pub fn with_certificate_validation_disabled(mut self) -> Self {
        self.validate_certificates = false;
        self
    }
}
