//! Host library catalog boundary.
//!
//! The scraper does not own item storage: series, seasons, episodes and
//! movies live in the host media server's catalog. This module defines the
//! `MediaStore` trait the resolvers talk to, the `LibraryItem` shape they
//! operate on, and an in-memory store used as the host stand-in in tests.

mod item;
mod memory;
pub mod names;

pub use item::{ItemKind, LibraryItem, ProviderIds};
pub use memory::MemoryMediaStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the host catalog.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Item does not exist.
    #[error("Item not found: {0}")]
    NotFound(Uuid),

    /// The host catalog failed to read or write.
    #[error("Catalog storage error: {0}")]
    Storage(String),
}

/// Trait for the host media catalog.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Fetch an item by id.
    async fn item(&self, id: Uuid) -> Result<Option<LibraryItem>, LibraryError>;

    /// Persist an updated item.
    async fn update_item(&self, item: &LibraryItem) -> Result<(), LibraryError>;

    /// List the direct children of an item, in library order.
    async fn children(&self, parent: Uuid) -> Result<Vec<LibraryItem>, LibraryError>;
}
