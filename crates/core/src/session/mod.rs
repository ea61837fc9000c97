//! Catalog session management.
//!
//! The catalog requires an authenticated session for most endpoints. This
//! module provides the `Session` trait consumed by the HTTP client and the
//! scrape engine, plus the anonymous and credential-backed implementations.

mod anonymous;
mod credential;

pub use anonymous::AnonymousSession;
pub use credential::{CredentialSession, Credentials};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when establishing or refreshing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Credentials were rejected by the catalog.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The login endpoint could not be reached.
    #[error("Login service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The session is not configured for authenticated access.
    #[error("Session configuration error: {0}")]
    Configuration(String),
}

/// Trait for catalog session providers.
///
/// A scrape run authenticates once up front via `ensure_authenticated`; the
/// HTTP client then asks for the bearer token on every request so that a
/// refreshed token is picked up mid-run.
#[async_trait]
pub trait Session: Send + Sync {
    /// Establish a session, logging in if necessary. Idempotent.
    async fn ensure_authenticated(&self) -> Result<(), SessionError>;

    /// Current bearer token, or `None` for anonymous access.
    async fn bearer_token(&self) -> Result<Option<String>, SessionError>;

    /// Name of this session method.
    fn method_name(&self) -> &'static str;
}
