//! Credential-backed session provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Session, SessionError};

/// Catalog account credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

struct TokenState {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Session provider that logs into the catalog's token endpoint and caches
/// the bearer token until shortly before expiry.
pub struct CredentialSession {
    client: Client,
    token_url: String,
    credentials: Credentials,
    state: RwLock<Option<TokenState>>,
}

/// Refresh this many seconds before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

impl CredentialSession {
    /// Create a new credential session against the given token endpoint.
    pub fn new(token_url: String, credentials: Credentials) -> Result<Self, SessionError> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(SessionError::Configuration(
                "username and password are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SessionError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            token_url,
            credentials,
            state: RwLock::new(None),
        })
    }

    async fn token_is_fresh(&self) -> bool {
        let state = self.state.read().await;
        match state.as_ref() {
            Some(s) => Utc::now() < s.expires_at,
            None => false,
        }
    }

    async fn login(&self) -> Result<(), SessionError> {
        debug!("logging into catalog token endpoint");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SessionError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::InvalidCredentials(body));
        }
        if !status.is_success() {
            return Err(SessionError::ServiceUnavailable(format!(
                "token endpoint returned status {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionError::ServiceUnavailable(e.to_string()))?;

        let expires_at =
            Utc::now() + chrono::Duration::seconds((token.expires_in - EXPIRY_MARGIN_SECS).max(0));

        let mut state = self.state.write().await;
        *state = Some(TokenState {
            access_token: token.access_token,
            expires_at,
        });

        Ok(())
    }
}

#[async_trait]
impl Session for CredentialSession {
    async fn ensure_authenticated(&self) -> Result<(), SessionError> {
        if self.token_is_fresh().await {
            return Ok(());
        }
        self.login().await
    }

    async fn bearer_token(&self) -> Result<Option<String>, SessionError> {
        if !self.token_is_fresh().await {
            self.login().await?;
        }
        let state = self.state.read().await;
        Ok(state.as_ref().map(|s| s.access_token.clone()))
    }

    fn method_name(&self) -> &'static str {
        "credentials"
    }
}
