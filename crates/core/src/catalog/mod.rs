//! Remote catalog client abstraction.
//!
//! This module provides the `CatalogClient` trait for querying the external
//! streaming catalog that metadata is scraped from, along with the HTTP
//! implementation backed by the catalog's REST API.

mod http;
mod types;

pub use http::{HttpCatalogClient, HttpCatalogConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the remote catalog.
///
/// "Not found" is not an error: lookups return `Lookup::NotFound` for a
/// definitive miss. These variants cover the retriable failures where nothing
/// can be concluded about the queried entity.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing base URL, credentials, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// Session could not supply a usable token.
    #[error("Session error: {0}")]
    Session(String),
}

/// Trait for remote catalog clients.
///
/// Lookup operations return `Result<Lookup<T>, CatalogError>`: `Found` on a
/// match, `NotFound` when the catalog answered definitively with no match,
/// `Err` when the call failed and nothing can be concluded.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search for a title (series or movie) by display name.
    async fn search_title(
        &self,
        name: &str,
        locale: &str,
    ) -> Result<Lookup<TitleHit>, CatalogError>;

    /// List all seasons of a title.
    async fn seasons(
        &self,
        title_id: &str,
        locale: &str,
    ) -> Result<Vec<SeasonListing>, CatalogError>;

    /// List all episodes of a season.
    async fn episodes(
        &self,
        season_id: &str,
        locale: &str,
    ) -> Result<Vec<EpisodeListing>, CatalogError>;

    /// Fetch a single episode by id. The returned listing carries the id of
    /// the season it belongs to.
    async fn episode_by_id(
        &self,
        episode_id: &str,
        locale: &str,
    ) -> Result<Lookup<EpisodeListing>, CatalogError>;

    /// Fetch series-level display metadata for a title.
    async fn series_metadata(
        &self,
        title_id: &str,
        locale: &str,
    ) -> Result<SeriesInfo, CatalogError>;

    /// Fetch the aggregate user rating for a title.
    async fn rating(&self, title_id: &str) -> Result<f32, CatalogError>;

    /// Resolve a season id by its descriptive name.
    async fn season_id_by_name(
        &self,
        title_id: &str,
        name: &str,
        locale: &str,
    ) -> Result<Lookup<String>, CatalogError>;

    /// Resolve a season id by its season number.
    ///
    /// `duplicate_counter` selects among remote seasons sharing the same
    /// number, in catalog order: 0 picks the first, 1 the second, and so on.
    /// A counter past the last duplicate yields `NotFound`.
    async fn season_id_by_number(
        &self,
        title_id: &str,
        season_number: u32,
        duplicate_counter: u32,
    ) -> Result<Lookup<String>, CatalogError>;

    /// Resolve an episode id by its 1-based ordinal within a season.
    async fn episode_id_by_position(
        &self,
        season_id: &str,
        ordinal: &str,
    ) -> Result<Lookup<EpisodeRef>, CatalogError>;
}
