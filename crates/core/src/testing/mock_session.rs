//! Mock session provider for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::session::{Session, SessionError};

/// Mock implementation of the `Session` trait.
///
/// Succeeds by default; flip `fail` to simulate login failures and inspect
/// `login_count` to assert how often authentication was attempted.
#[derive(Debug, Default)]
pub struct MockSession {
    fail: AtomicBool,
    login_count: AtomicUsize,
}

impl MockSession {
    /// Create a new mock session that authenticates successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent authentication attempts fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of authentication attempts so far.
    pub fn login_count(&self) -> usize {
        self.login_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Session for MockSession {
    async fn ensure_authenticated(&self) -> Result<(), SessionError> {
        self.login_count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SessionError::InvalidCredentials(
                "mock login rejected".to_string(),
            ));
        }
        Ok(())
    }

    async fn bearer_token(&self) -> Result<Option<String>, SessionError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SessionError::InvalidCredentials(
                "mock login rejected".to_string(),
            ));
        }
        Ok(Some("mock-token".to_string()))
    }

    fn method_name(&self) -> &'static str {
        "mock"
    }
}
