//! Persisted metadata aggregate storage.
//!
//! The scrape engine buffers upserts and commits them in a single
//! transaction: either the whole merged aggregate becomes durable or none of
//! it does. `load` always reads committed state.

mod sqlite;

pub use sqlite::SqliteMetadataStore;

use thiserror::Error;

use crate::scrape::TitleMetadata;

/// Errors for aggregate storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for aggregate storage backends.
pub trait MetadataStore: Send + Sync {
    /// Load the committed aggregate for a title and locale, if any.
    fn load(&self, title_id: &str, locale: &str) -> Result<Option<TitleMetadata>, StoreError>;

    /// Stage an aggregate for the next commit. Staging the same
    /// `(external_id, locale)` twice keeps the later aggregate.
    fn upsert(&self, aggregate: &TitleMetadata) -> Result<(), StoreError>;

    /// Write all staged aggregates in one transaction. On failure nothing is
    /// persisted and the staged aggregates are discarded.
    fn commit(&self) -> Result<(), StoreError>;
}
