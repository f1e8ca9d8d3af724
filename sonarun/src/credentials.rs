//! Issuing and revoking the analysis access token.

use log::{debug, error, info, warn};
use sonarqube_api::SonarError;

use crate::backend::Backend;

/// Prefix of every token name generated by this tool
pub const TOKEN_NAME_PREFIX: &str = "sonarun";

/// Custom error types for credential operations
#[derive(thiserror::Error, Debug)]
pub enum CredentialError {
    #[error("Token generation failed for '{name}': {source}")]
    Generation {
        name: String,
        #[source]
        source: SonarError,
    },

    #[error("Backend returned an empty token for '{name}'")]
    EmptyToken { name: String },
}

/// Secure wrapper for the issued token that redacts the value in debug output
#[derive(Clone)]
pub struct AccessToken {
    name: String,
    value: String,
}

impl AccessToken {
    pub fn new(name: String, value: String) -> Self {
        AccessToken { name, value }
    }

    /// Name under which the backend knows the token
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Unique token name for one run
#[must_use]
pub fn generate_token_name() -> String {
    format!("{TOKEN_NAME_PREFIX}-{}", uuid::Uuid::new_v4())
}

/// Obtain a fresh access token with the configured account.
///
/// # Errors
///
/// Returns [`CredentialError`] if the backend rejects the request or answers
/// without a token value.
pub async fn issue_token<B: Backend>(backend: &B) -> Result<AccessToken, CredentialError> {
    let name = generate_token_name();
    info!("🔑 Requesting access token '{name}'");

    let token = match backend.generate_token(&name).await {
        Ok(token) => token,
        Err(source) => {
            error!("❌ Token generation failed: {source}");
            return Err(CredentialError::Generation { name, source });
        }
    };

    if token.token.is_empty() {
        return Err(CredentialError::EmptyToken { name });
    }

    debug!("   Issued token: {token:?}");
    info!("✅ Access token issued");
    Ok(AccessToken::new(token.name, token.token))
}

/// Revoke a previously issued token. Failures are logged and otherwise ignored.
pub async fn revoke_token<B: Backend>(backend: &B, token: &AccessToken) -> bool {
    match backend.revoke_token(token.name()).await {
        Ok(()) => {
            info!("🔑 Access token '{}' revoked", token.name());
            true
        }
        Err(e) => {
            warn!("⚠️  Could not revoke access token '{}': {e}", token.name());
            false
        }
    }
}
