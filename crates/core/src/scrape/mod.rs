//! Metadata reconciliation engine.
//!
//! Given a resolved title id, the engine fetches the full remote
//! season/episode tree plus series-level fields, merges it into the
//! previously persisted aggregate, and persists the result. Merging is
//! append-and-overwrite: see `merge` for the exact rules.

mod aggregate;
mod engine;
pub mod merge;

pub use aggregate::{EpisodeRecord, SeasonRecord, TitleMetadata};
pub use engine::{ExtraEpisode, ScrapeEngine, ScrapeRequest, ScrapeSummary};

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::session::SessionError;
use crate::store::StoreError;

/// Errors that abort a scrape run.
///
/// Per-season episode-fetch failures are not here: they degrade that season
/// to an empty fetch and the run continues.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Login failed; nothing was fetched or written.
    #[error("Authentication failed: {0}")]
    Session(#[from] SessionError),

    /// A fatal catalog call failed (season list or series metadata).
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The merged aggregate could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cancellation was signalled before the merge was persisted.
    #[error("Scrape cancelled")]
    Cancelled,
}
