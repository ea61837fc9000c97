//! Post-id hook that records its invocations.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::library::LibraryItem;
use crate::resolver::PostIdHook;

/// Hook implementation that records every visited item.
///
/// Use `visited` to assert that hooks ran - including for items whose
/// resolution failed or was skipped.
#[derive(Debug, Default)]
pub struct RecordingHook {
    visited: Arc<RwLock<Vec<Uuid>>>,
    fail: bool,
}

impl RecordingHook {
    /// Create a hook that records and succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hook that records and then fails.
    pub fn failing() -> Self {
        Self {
            visited: Arc::new(RwLock::new(Vec::new())),
            fail: true,
        }
    }

    /// Ids of all visited items, in visit order.
    pub async fn visited(&self) -> Vec<Uuid> {
        self.visited.read().await.clone()
    }

    /// Number of invocations so far.
    pub async fn visit_count(&self) -> usize {
        self.visited.read().await.len()
    }
}

#[async_trait]
impl PostIdHook for RecordingHook {
    async fn on_id_set(&self, item: &LibraryItem) -> anyhow::Result<()> {
        self.visited.write().await.push(item.id);
        if self.fail {
            anyhow::bail!("recording hook configured to fail");
        }
        Ok(())
    }
}
