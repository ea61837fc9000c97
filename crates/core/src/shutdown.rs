//! Cooperative cancellation for long-running scraper operations.
//!
//! Resolvers and the scrape engine check the token before issuing each
//! remote call: cancellation stops new network traffic, while persistence
//! writes already in flight complete or roll back atomically.

use tokio::sync::watch;

/// Controller side of a shutdown signal.
///
/// Cheap to create; hand out tokens via [`ShutdownController::token`] and
/// flip the signal once with [`ShutdownController::shutdown`].
#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Create a token observing this controller.
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Signal cancellation to all tokens.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// A token that never fires. For callers without a cancellation source.
    pub fn none() -> Self {
        // Dropping the sender closes the channel, but receivers keep reading
        // the last value, which stays `false` forever.
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// True once cancellation was signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}
