//! In-memory media store.
//!
//! Stand-in for the host catalog, used by tests and by embedders that feed
//! items in from their own storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LibraryError, LibraryItem, MediaStore};

/// In-memory `MediaStore` backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    items: RwLock<HashMap<Uuid, LibraryItem>>,
    /// Insertion order per parent, so `children` is deterministic.
    order: RwLock<Vec<Uuid>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item.
    pub async fn insert(&self, item: LibraryItem) {
        let mut order = self.order.write().await;
        let mut items = self.items.write().await;
        if !items.contains_key(&item.id) {
            order.push(item.id);
        }
        items.insert(item.id, item);
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// True when the store holds no items.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn item(&self, id: Uuid) -> Result<Option<LibraryItem>, LibraryError> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn update_item(&self, item: &LibraryItem) -> Result<(), LibraryError> {
        let mut items = self.items.write().await;
        match items.get_mut(&item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(LibraryError::NotFound(item.id)),
        }
    }

    async fn children(&self, parent: Uuid) -> Result<Vec<LibraryItem>, LibraryError> {
        let order = self.order.read().await;
        let items = self.items.read().await;
        Ok(order
            .iter()
            .filter_map(|id| items.get(id))
            .filter(|item| item.parent_id == Some(parent))
            .cloned()
            .collect())
    }
}
