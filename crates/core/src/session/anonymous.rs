use async_trait::async_trait;

use super::{Session, SessionError};

/// Session provider for catalogs that serve metadata without login.
///
/// Must be explicitly configured - the system won't default to this.
pub struct AnonymousSession;

impl AnonymousSession {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnonymousSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Session for AnonymousSession {
    async fn ensure_authenticated(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn bearer_token(&self) -> Result<Option<String>, SessionError> {
        Ok(None)
    }

    fn method_name(&self) -> &'static str {
        "anonymous"
    }
}
