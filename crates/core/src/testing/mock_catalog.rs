//! Mock remote catalog for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{
    CatalogClient, CatalogError, EpisodeListing, EpisodeRef, Lookup, SeasonListing, SeriesInfo,
    TitleHit,
};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedQuery {
    SearchTitle { name: String, locale: String },
    Seasons { title_id: String, locale: String },
    Episodes { season_id: String, locale: String },
    EpisodeById { episode_id: String },
    SeriesMetadata { title_id: String },
    Rating { title_id: String },
    SeasonIdByName { title_id: String, name: String },
    SeasonIdByNumber { title_id: String, season_number: u32, duplicate_counter: u32 },
    EpisodeIdByPosition { season_id: String, ordinal: String },
}

/// Mock implementation of the `CatalogClient` trait.
///
/// Provides controllable behavior for testing:
/// - Configurable titles, seasons, episodes, series info and ratings
/// - Query recording for assertions
/// - One-shot and targeted failure injection
///
/// # Example
///
/// ```rust,ignore
/// use rollarr_core::testing::{fixtures, MockCatalog};
///
/// let catalog = MockCatalog::new();
/// catalog.add_title(fixtures::title_hit("T1", "Cowboy Bebop")).await;
/// catalog.add_season("T1", fixtures::season_listing("S1", 1, "Session One")).await;
///
/// let hit = catalog.search_title("cowboy bebop", "en-US").await?;
/// ```
#[derive(Debug, Default)]
pub struct MockCatalog {
    /// Searchable titles, matched by case-insensitive name containment.
    titles: Arc<RwLock<Vec<TitleHit>>>,
    /// Seasons by title id, in catalog order.
    seasons: Arc<RwLock<HashMap<String, Vec<SeasonListing>>>>,
    /// Episodes by season id, in catalog order.
    episodes: Arc<RwLock<HashMap<String, Vec<EpisodeListing>>>>,
    /// Episodes fetchable by id.
    episodes_by_id: Arc<RwLock<HashMap<String, EpisodeListing>>>,
    /// Series info by title id.
    series_info: Arc<RwLock<HashMap<String, SeriesInfo>>>,
    /// Ratings by title id.
    ratings: Arc<RwLock<HashMap<String, f32>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedQuery>>>,
    /// If set, the next operation fails with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    /// Season ids whose episode listing always fails.
    fail_episodes_for: Arc<RwLock<HashSet<String>>>,
    /// When true, every rating fetch fails.
    fail_rating: Arc<RwLock<bool>>,
    /// When true, every season-by-number lookup fails.
    fail_season_number_lookups: Arc<RwLock<bool>>,
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Content Configuration
    // =========================================================================

    /// Add a searchable title.
    pub async fn add_title(&self, hit: TitleHit) {
        self.titles.write().await.push(hit);
    }

    /// Append a season to a title's listing.
    pub async fn add_season(&self, title_id: &str, season: SeasonListing) {
        self.seasons
            .write()
            .await
            .entry(title_id.to_string())
            .or_default()
            .push(season);
    }

    /// Append an episode to a season's listing and make it fetchable by id.
    pub async fn add_episode(&self, season_id: &str, mut episode: EpisodeListing) {
        episode.season_id = season_id.to_string();
        self.episodes_by_id
            .write()
            .await
            .insert(episode.id.clone(), episode.clone());
        self.episodes
            .write()
            .await
            .entry(season_id.to_string())
            .or_default()
            .push(episode);
    }

    /// Register an episode fetchable by id only, outside any listed season.
    pub async fn add_detached_episode(&self, episode: EpisodeListing) {
        self.episodes_by_id
            .write()
            .await
            .insert(episode.id.clone(), episode);
    }

    /// Set the series info for a title.
    pub async fn set_series_info(&self, title_id: &str, info: SeriesInfo) {
        self.series_info
            .write()
            .await
            .insert(title_id.to_string(), info);
    }

    /// Set the rating for a title.
    pub async fn set_rating(&self, title_id: &str, rating: f32) {
        self.ratings.write().await.insert(title_id.to_string(), rating);
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Clear recorded queries.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every episode listing for the given season fail.
    pub async fn fail_episodes_for(&self, season_id: &str) {
        self.fail_episodes_for
            .write()
            .await
            .insert(season_id.to_string());
    }

    /// Make every rating fetch fail.
    pub async fn fail_rating(&self, fail: bool) {
        *self.fail_rating.write().await = fail;
    }

    /// Make every season-by-number lookup fail.
    pub async fn fail_season_number_lookups(&self, fail: bool) {
        *self.fail_season_number_lookups.write().await = fail;
    }

    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, query: RecordedQuery) {
        self.queries.write().await.push(query);
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn search_title(
        &self,
        name: &str,
        locale: &str,
    ) -> Result<Lookup<TitleHit>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::SearchTitle {
            name: name.to_string(),
            locale: locale.to_string(),
        })
        .await;

        let titles = self.titles.read().await;
        let query_lower = name.to_lowercase();

        let hit = titles
            .iter()
            .find(|t| t.name.to_lowercase().contains(&query_lower))
            .cloned();

        Ok(match hit {
            Some(hit) => Lookup::Found(hit),
            None => Lookup::NotFound,
        })
    }

    async fn seasons(
        &self,
        title_id: &str,
        locale: &str,
    ) -> Result<Vec<SeasonListing>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::Seasons {
            title_id: title_id.to_string(),
            locale: locale.to_string(),
        })
        .await;

        Ok(self
            .seasons
            .read()
            .await
            .get(title_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn episodes(
        &self,
        season_id: &str,
        locale: &str,
    ) -> Result<Vec<EpisodeListing>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::Episodes {
            season_id: season_id.to_string(),
            locale: locale.to_string(),
        })
        .await;

        if self.fail_episodes_for.read().await.contains(season_id) {
            return Err(CatalogError::Api {
                status: 500,
                message: format!("episode listing for {} unavailable", season_id),
            });
        }

        Ok(self
            .episodes
            .read()
            .await
            .get(season_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn episode_by_id(
        &self,
        episode_id: &str,
        _locale: &str,
    ) -> Result<Lookup<EpisodeListing>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::EpisodeById {
            episode_id: episode_id.to_string(),
        })
        .await;

        Ok(match self.episodes_by_id.read().await.get(episode_id) {
            Some(episode) => Lookup::Found(episode.clone()),
            None => Lookup::NotFound,
        })
    }

    async fn series_metadata(
        &self,
        title_id: &str,
        _locale: &str,
    ) -> Result<SeriesInfo, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::SeriesMetadata {
            title_id: title_id.to_string(),
        })
        .await;

        self.series_info
            .read()
            .await
            .get(title_id)
            .cloned()
            .ok_or_else(|| CatalogError::Api {
                status: 404,
                message: format!("series {} not found", title_id),
            })
    }

    async fn rating(&self, title_id: &str) -> Result<f32, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::Rating {
            title_id: title_id.to_string(),
        })
        .await;

        if *self.fail_rating.read().await {
            return Err(CatalogError::Api {
                status: 500,
                message: "ratings unavailable".to_string(),
            });
        }

        Ok(self
            .ratings
            .read()
            .await
            .get(title_id)
            .copied()
            .unwrap_or(0.0))
    }

    async fn season_id_by_name(
        &self,
        title_id: &str,
        name: &str,
        _locale: &str,
    ) -> Result<Lookup<String>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::SeasonIdByName {
            title_id: title_id.to_string(),
            name: name.to_string(),
        })
        .await;

        let seasons = self.seasons.read().await;
        let wanted = name.trim().to_lowercase();

        let hit = seasons
            .get(title_id)
            .into_iter()
            .flatten()
            .find(|s| s.title.trim().to_lowercase() == wanted)
            .map(|s| s.id.clone());

        Ok(match hit {
            Some(id) => Lookup::Found(id),
            None => Lookup::NotFound,
        })
    }

    async fn season_id_by_number(
        &self,
        title_id: &str,
        season_number: u32,
        duplicate_counter: u32,
    ) -> Result<Lookup<String>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::SeasonIdByNumber {
            title_id: title_id.to_string(),
            season_number,
            duplicate_counter,
        })
        .await;

        if *self.fail_season_number_lookups.read().await {
            return Err(CatalogError::Api {
                status: 500,
                message: "season lookup unavailable".to_string(),
            });
        }

        let seasons = self.seasons.read().await;

        let hit = seasons
            .get(title_id)
            .into_iter()
            .flatten()
            .filter(|s| s.season_number == season_number)
            .nth(duplicate_counter as usize)
            .map(|s| s.id.clone());

        Ok(match hit {
            Some(id) => Lookup::Found(id),
            None => Lookup::NotFound,
        })
    }

    async fn episode_id_by_position(
        &self,
        season_id: &str,
        ordinal: &str,
    ) -> Result<Lookup<EpisodeRef>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedQuery::EpisodeIdByPosition {
            season_id: season_id.to_string(),
            ordinal: ordinal.to_string(),
        })
        .await;

        let episodes = self.episodes.read().await;

        let hit = episodes
            .get(season_id)
            .into_iter()
            .flatten()
            .find(|e| e.ordinal == ordinal)
            .map(|e| EpisodeRef {
                id: e.id.clone(),
                slug_title: e.slug_title.clone(),
            });

        Ok(match hit {
            Some(found) => Lookup::Found(found),
            None => Lookup::NotFound,
        })
    }
}
