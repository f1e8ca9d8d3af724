//! User Tokens API: short-lived analysis tokens.

use log::debug;
use serde::Deserialize;
use std::borrow::Cow;

use crate::{SonarClient, SonarError};

/// Response of `POST /api/user_tokens/generate`
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserToken {
    /// Login of the token owner
    pub login: Option<String>,
    /// Token name, unique per user
    pub name: String,
    /// The token value; only ever returned once, at generation time
    pub token: String,
    /// Creation date as reported by the backend
    pub created_at: Option<String>,
}

impl std::fmt::Debug for UserToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserToken")
            .field("login", &self.login)
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// User Tokens API client
pub struct TokensApi<'a> {
    client: &'a SonarClient,
}

impl<'a> TokensApi<'a> {
    #[must_use]
    pub fn new(client: &'a SonarClient) -> Self {
        Self { client }
    }

    /// Generate a new token for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`SonarError::Authentication`] when the credentials are rejected,
    /// [`SonarError::UnexpectedStatus`] for other failures (for example a
    /// duplicate token name), and [`SonarError::InvalidResponse`] when the
    /// body carries no token.
    pub async fn generate(&self, name: &str) -> Result<UserToken, SonarError> {
        debug!("🎟️  Generating user token '{name}'");
        let response = self
            .client
            .post_form("/api/user_tokens/generate", &[("name", name)])
            .await?;
        SonarClient::read_json(response, Cow::Borrowed("token generation")).await
    }

    /// Revoke a token of the authenticated user by name.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn revoke(&self, name: &str) -> Result<(), SonarError> {
        debug!("🎟️  Revoking user token '{name}'");
        let response = self
            .client
            .post_form("/api/user_tokens/revoke", &[("name", name)])
            .await?;
        SonarClient::read_body(response, Cow::Borrowed("token revocation")).await?;
        Ok(())
    }
}
