//! HTTP client for the remote catalog's REST API.
//!
//! Season/episode id lookups are served from the listing endpoints: the
//! catalog has no dedicated lookup routes, so `season_id_by_name` and friends
//! fetch the relevant listing and select from it client-side.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::Session;

use super::types::{
    EpisodeListing, EpisodeRef, ImageSource, Lookup, SeasonListing, SeriesInfo, TitleHit,
};
use super::{CatalogClient, CatalogError};

/// HTTP catalog client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpCatalogConfig {
    /// Base URL of the catalog API (required).
    pub base_url: String,
    /// Maximum results requested from the search endpoint.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_limit() -> u32 {
    6
}

fn default_timeout_secs() -> u64 {
    30
}

impl From<&crate::config::CatalogSettings> for HttpCatalogConfig {
    fn from(settings: &crate::config::CatalogSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            search_limit: settings.search_limit,
            timeout_secs: settings.timeout_secs,
        }
    }
}

/// HTTP catalog client.
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    search_limit: u32,
    session: Arc<dyn Session>,
}

impl HttpCatalogClient {
    /// Create a new catalog client.
    pub fn new(
        config: HttpCatalogConfig,
        session: Arc<dyn Session>,
    ) -> Result<Self, CatalogError> {
        if config.base_url.is_empty() {
            return Err(CatalogError::NotConfigured(
                "catalog base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_limit: config.search_limit,
            session,
        })
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, CatalogError> {
        match self
            .session
            .bearer_token()
            .await
            .map_err(|e| CatalogError::Session(e.to_string()))?
        {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Ok(request),
        }
    }

    /// Map non-success statuses onto the error taxonomy. 404 is handled by
    /// callers that treat it as a definitive miss.
    async fn check_status(response: Response) -> Result<Response, CatalogError> {
        let status = response.status();
        if status == 429 {
            return Err(CatalogError::RateLimitExceeded);
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Session(format!(
                "catalog rejected the session token: {}",
                body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search_title(
        &self,
        name: &str,
        locale: &str,
    ) -> Result<Lookup<TitleHit>, CatalogError> {
        let url = format!(
            "{}/content/v2/discover/search?q={}&n={}&locale={}",
            self.base_url,
            urlencoding::encode(name),
            self.search_limit,
            locale
        );

        debug!("catalog title search: query='{}', locale={}", name, locale);

        let request = self.authorize(self.client.get(&url)).await?;
        let response = Self::check_status(request.send().await?).await?;

        let search: SearchResponse = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse search response: {}", e))
        })?;

        let hit = search
            .data
            .into_iter()
            .flat_map(|bucket| bucket.items)
            .next();

        match hit {
            Some(item) => Ok(Lookup::Found(item.into())),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn seasons(
        &self,
        title_id: &str,
        locale: &str,
    ) -> Result<Vec<SeasonListing>, CatalogError> {
        let url = format!(
            "{}/content/v2/cms/series/{}/seasons?locale={}",
            self.base_url, title_id, locale
        );

        debug!("catalog seasons: title={}, locale={}", title_id, locale);

        let request = self.authorize(self.client.get(&url)).await?;
        let response = Self::check_status(request.send().await?).await?;

        let listing: DataResponse<SeasonResult> = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse seasons response: {}", e))
        })?;

        Ok(listing.data.into_iter().map(|s| s.into()).collect())
    }

    async fn episodes(
        &self,
        season_id: &str,
        locale: &str,
    ) -> Result<Vec<EpisodeListing>, CatalogError> {
        let url = format!(
            "{}/content/v2/cms/seasons/{}/episodes?locale={}",
            self.base_url, season_id, locale
        );

        debug!("catalog episodes: season={}, locale={}", season_id, locale);

        let request = self.authorize(self.client.get(&url)).await?;
        let response = Self::check_status(request.send().await?).await?;

        let listing: DataResponse<EpisodeResult> = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse episodes response: {}", e))
        })?;

        Ok(listing.data.into_iter().map(|e| e.into()).collect())
    }

    async fn episode_by_id(
        &self,
        episode_id: &str,
        locale: &str,
    ) -> Result<Lookup<EpisodeListing>, CatalogError> {
        let url = format!(
            "{}/content/v2/cms/episodes/{}?locale={}",
            self.base_url, episode_id, locale
        );

        debug!("catalog episode by id: episode={}", episode_id);

        let request = self.authorize(self.client.get(&url)).await?;
        let response = request.send().await?;

        if response.status() == 404 {
            return Ok(Lookup::NotFound);
        }
        let response = Self::check_status(response).await?;

        let listing: DataResponse<EpisodeResult> = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse episode response: {}", e))
        })?;

        match listing.data.into_iter().next() {
            Some(episode) => Ok(Lookup::Found(episode.into())),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn series_metadata(
        &self,
        title_id: &str,
        locale: &str,
    ) -> Result<SeriesInfo, CatalogError> {
        let url = format!(
            "{}/content/v2/cms/series/{}?locale={}",
            self.base_url, title_id, locale
        );

        debug!("catalog series metadata: title={}", title_id);

        let request = self.authorize(self.client.get(&url)).await?;
        let response = Self::check_status(request.send().await?).await?;

        let listing: DataResponse<SeriesResult> = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse series response: {}", e))
        })?;

        listing
            .data
            .into_iter()
            .next()
            .map(|s| s.into())
            .ok_or_else(|| CatalogError::Parse("series response carried no data".to_string()))
    }

    async fn rating(&self, title_id: &str) -> Result<f32, CatalogError> {
        let url = format!(
            "{}/content-reviews/v2/rating/series/{}",
            self.base_url, title_id
        );

        debug!("catalog rating: title={}", title_id);

        let request = self.authorize(self.client.get(&url)).await?;
        let response = Self::check_status(request.send().await?).await?;

        let rating: RatingResult = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse rating response: {}", e))
        })?;

        Ok(rating.average)
    }

    async fn season_id_by_name(
        &self,
        title_id: &str,
        name: &str,
        locale: &str,
    ) -> Result<Lookup<String>, CatalogError> {
        let seasons = self.seasons(title_id, locale).await?;
        let wanted = name.trim().to_lowercase();

        let hit = seasons
            .into_iter()
            .find(|s| s.title.trim().to_lowercase() == wanted);

        match hit {
            Some(season) => Ok(Lookup::Found(season.id)),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn season_id_by_number(
        &self,
        title_id: &str,
        season_number: u32,
        duplicate_counter: u32,
    ) -> Result<Lookup<String>, CatalogError> {
        // Number lookups are locale-independent; the catalog orders duplicate
        // numbers by sequence, which is what the counter indexes into.
        let seasons = self.seasons(title_id, "en-US").await?;

        let hit = seasons
            .into_iter()
            .filter(|s| s.season_number == season_number)
            .nth(duplicate_counter as usize);

        match hit {
            Some(season) => Ok(Lookup::Found(season.id)),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn episode_id_by_position(
        &self,
        season_id: &str,
        ordinal: &str,
    ) -> Result<Lookup<EpisodeRef>, CatalogError> {
        let episodes = self.episodes(season_id, "en-US").await?;

        let hit = episodes.into_iter().find(|e| e.ordinal == ordinal);

        match hit {
            Some(episode) => Ok(Lookup::Found(EpisodeRef {
                id: episode.id,
                slug_title: episode.slug_title,
            })),
            None => Ok(Lookup::NotFound),
        }
    }
}

// ============================================================================
// Catalog API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    #[serde(default)]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchBucket>,
}

#[derive(Debug, Deserialize)]
struct SearchBucket {
    #[serde(default)]
    items: Vec<TitleResult>,
}

#[derive(Debug, Deserialize)]
struct TitleResult {
    id: String,
    title: String,
    slug_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SeasonResult {
    id: String,
    title: String,
    slug_title: Option<String>,
    season_number: u32,
    season_sequence_number: u32,
    season_display_number: Option<String>,
    identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EpisodeResult {
    id: String,
    title: String,
    slug_title: Option<String>,
    description: Option<String>,
    episode: Option<String>,
    episode_number: Option<u32>,
    sequence_number: u32,
    season_id: Option<String>,
    #[serde(default)]
    images: ImagesResult,
}

#[derive(Debug, Default, Deserialize)]
struct SeriesResult {
    title: String,
    slug_title: Option<String>,
    description: Option<String>,
    content_provider: Option<String>,
    #[serde(default)]
    images: ImagesResult,
}

/// Image groups come as arrays of renditions nested per display context.
#[derive(Debug, Default, Deserialize)]
struct ImagesResult {
    #[serde(default)]
    poster_tall: Vec<Vec<ImageResult>>,
    #[serde(default)]
    poster_wide: Vec<Vec<ImageResult>>,
    #[serde(default)]
    thumbnail: Vec<Vec<ImageResult>>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    source: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct RatingResult {
    average: f32,
}

// ============================================================================
// Conversions
// ============================================================================

fn flatten_images(groups: Vec<Vec<ImageResult>>) -> Vec<ImageSource> {
    groups
        .into_iter()
        .flatten()
        .map(|i| ImageSource {
            url: i.source,
            width: i.width,
            height: i.height,
        })
        .collect()
}

impl From<TitleResult> for TitleHit {
    fn from(r: TitleResult) -> Self {
        Self {
            id: r.id,
            slug_title: r.slug_title.unwrap_or_default(),
            name: r.title,
        }
    }
}

impl From<SeasonResult> for SeasonListing {
    fn from(s: SeasonResult) -> Self {
        Self {
            id: s.id,
            title: s.title,
            slug_title: s.slug_title.unwrap_or_default(),
            season_number: s.season_number,
            sequence_number: s.season_sequence_number,
            display_number: s.season_display_number.unwrap_or_default(),
            identifier: s.identifier.unwrap_or_default(),
        }
    }
}

impl From<EpisodeResult> for EpisodeListing {
    fn from(e: EpisodeResult) -> Self {
        let ordinal = match e.episode {
            Some(o) => o,
            None => e.sequence_number.to_string(),
        };
        let episode_number = e.episode_number.or_else(|| ordinal.parse().ok());
        Self {
            id: e.id,
            title: e.title,
            slug_title: e.slug_title.unwrap_or_default(),
            description: e.description.unwrap_or_default(),
            ordinal,
            episode_number,
            sequence_number: e.sequence_number,
            thumbnails: flatten_images(e.images.thumbnail),
            season_id: e.season_id.unwrap_or_default(),
        }
    }
}

impl From<SeriesResult> for SeriesInfo {
    fn from(s: SeriesResult) -> Self {
        Self {
            title: s.title,
            description: s.description.unwrap_or_default(),
            slug_title: s.slug_title.unwrap_or_default(),
            studio: s.content_provider.unwrap_or_default(),
            poster_tall: flatten_images(s.images.poster_tall),
            poster_wide: flatten_images(s.images.poster_wide),
        }
    }
}
