//! Post-id-set hook fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::library::LibraryItem;
use crate::metrics;

/// A follow-up task invoked after a resolver visits an item.
///
/// Hooks run whether or not an id was assigned - downstream stages use the
/// invocation itself to observe "this item was visited", so implementations
/// must tolerate items with missing or empty provider ids.
#[async_trait]
pub trait PostIdHook: Send + Sync {
    /// Called once per visited item, in registration order.
    async fn on_id_set(&self, item: &LibraryItem) -> anyhow::Result<()>;
}

/// Invoke all hooks for an item, in order. A hook error is logged and does
/// not stop the remaining hooks.
pub(crate) async fn run_hooks(hooks: &[Arc<dyn PostIdHook>], item: &LibraryItem) {
    for hook in hooks {
        match hook.on_id_set(item).await {
            Ok(()) => {
                metrics::HOOK_INVOCATIONS.with_label_values(&["ok"]).inc();
            }
            Err(e) => {
                metrics::HOOK_INVOCATIONS.with_label_values(&["error"]).inc();
                warn!("post-id hook failed for item {}: {}", item.id, e);
            }
        }
    }
}
