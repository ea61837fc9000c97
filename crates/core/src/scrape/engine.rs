//! Scrape engine implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogClient, Lookup, SeasonListing};
use crate::metrics;
use crate::session::Session;
use crate::shutdown::ShutdownToken;
use crate::store::MetadataStore;

use super::aggregate::{EpisodeRecord, SeasonRecord, TitleMetadata};
use super::{merge, ScrapeError};

/// A movie's episode that must exist in the final aggregate even when the
/// normal season/episode fetch does not discover it.
#[derive(Debug, Clone)]
pub struct ExtraEpisode {
    /// Remote season id the episode is expected under.
    pub season_id: String,
    /// Remote episode id.
    pub episode_id: String,
}

/// One scrape of a resolved title.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// Remote title id.
    pub title_id: String,
    /// Locale to fetch prose fields in.
    pub locale: String,
    /// Movie episode to graft in, if any.
    pub extra_episode: Option<ExtraEpisode>,
}

impl ScrapeRequest {
    pub fn new(title_id: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            title_id: title_id.into(),
            locale: locale.into(),
            extra_episode: None,
        }
    }

    /// Require the given episode to be present in the final aggregate.
    pub fn with_extra_episode(mut self, season_id: impl Into<String>, episode_id: impl Into<String>) -> Self {
        self.extra_episode = Some(ExtraEpisode {
            season_id: season_id.into(),
            episode_id: episode_id.into(),
        });
        self
    }
}

/// Result summary of a completed scrape.
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    /// Remote title id that was scraped.
    pub title_id: String,
    /// Locale the scrape ran in.
    pub locale: String,
    /// True when a fresh aggregate was created rather than merged into.
    pub created: bool,
    /// Remote seasons seen in this pass.
    pub seasons_total: usize,
    /// Seasons whose episode fetch failed and degraded to an empty list.
    pub seasons_failed: usize,
    /// Episodes fetched in this pass.
    pub episodes_fetched: usize,
}

type AggregateKey = (String, String);

/// The metadata reconciliation engine.
///
/// Fetches are issued concurrently per season; the load-merge-persist step
/// runs as a critical section per `(title_id, locale)` so concurrent scrapes
/// of the same title cannot lose updates.
pub struct ScrapeEngine {
    catalog: Arc<dyn CatalogClient>,
    session: Arc<dyn Session>,
    store: Arc<dyn MetadataStore>,
    max_parallel_fetches: usize,
    locks: Mutex<HashMap<AggregateKey, Arc<Mutex<()>>>>,
}

impl ScrapeEngine {
    /// Creates a new scrape engine.
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        session: Arc<dyn Session>,
        store: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            catalog,
            session,
            store,
            max_parallel_fetches: 4,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Bound the number of concurrent per-season episode fetches.
    pub fn with_max_parallel_fetches(mut self, max: usize) -> Self {
        self.max_parallel_fetches = max.max(1);
        self
    }

    /// Run one scrape.
    pub async fn scrape(
        &self,
        request: &ScrapeRequest,
        shutdown: &ShutdownToken,
    ) -> Result<ScrapeSummary, ScrapeError> {
        let started = Instant::now();
        let result = self.run(request, shutdown).await;

        let label = match &result {
            Ok(_) => "success",
            Err(ScrapeError::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        metrics::SCRAPES_TOTAL.with_label_values(&[label]).inc();
        metrics::SCRAPE_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        result
    }

    async fn run(
        &self,
        request: &ScrapeRequest,
        shutdown: &ShutdownToken,
    ) -> Result<ScrapeSummary, ScrapeError> {
        if shutdown.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        self.session.ensure_authenticated().await?;

        if shutdown.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let seasons = self
            .catalog
            .seasons(&request.title_id, &request.locale)
            .await?;

        debug!(
            "scraping title {}: {} remote seasons",
            request.title_id,
            seasons.len()
        );

        let (fetched, seasons_failed) = self.fetch_episodes(&seasons, request, shutdown).await;

        if shutdown.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let info = self
            .catalog
            .series_metadata(&request.title_id, &request.locale)
            .await?;

        // Rating lives on a separate endpoint; its absence is not fatal.
        let rating = match self.catalog.rating(&request.title_id).await {
            Ok(r) => r,
            Err(e) => {
                debug!("rating fetch failed for {}: {}", request.title_id, e);
                0.0
            }
        };

        if shutdown.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let seasons_total = fetched.len();
        let episodes_fetched: usize = fetched.iter().map(|s| s.episodes.len()).sum();

        // Critical section: one load-merge-persist at a time per aggregate.
        let lock = self.aggregate_lock(&request.title_id, &request.locale).await;
        let _guard = lock.lock().await;

        let existing = self.store.load(&request.title_id, &request.locale)?;
        let created = existing.is_none();
        let mut aggregate = existing
            .unwrap_or_else(|| TitleMetadata::new(&request.title_id, &request.locale));

        for season in fetched {
            merge::merge_season(&mut aggregate, season);
        }
        merge::apply_series_info(&mut aggregate, &info, rating);

        if let Some(extra) = &request.extra_episode {
            self.graft_extra_episode(&mut aggregate, extra, &request.locale).await;
        }

        self.store.upsert(&aggregate)?;
        self.store.commit()?;

        info!(
            "scraped title {} ({}): {} seasons, {} episodes{}",
            request.title_id,
            request.locale,
            seasons_total,
            episodes_fetched,
            if created { ", new aggregate" } else { "" }
        );

        Ok(ScrapeSummary {
            title_id: request.title_id.clone(),
            locale: request.locale.clone(),
            created,
            seasons_total,
            seasons_failed,
            episodes_fetched,
        })
    }

    /// Fetch episode lists for all seasons concurrently. A failed fetch
    /// degrades that season to an empty episode list; existing persisted
    /// episodes survive because the merge never deletes.
    async fn fetch_episodes(
        &self,
        seasons: &[SeasonListing],
        request: &ScrapeRequest,
        shutdown: &ShutdownToken,
    ) -> (Vec<SeasonRecord>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_fetches));

        let fetches = seasons.iter().cloned().map(|season| {
            let catalog = Arc::clone(&self.catalog);
            let semaphore = Arc::clone(&semaphore);
            let locale = request.locale.clone();
            let shutdown = shutdown.clone();
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (season, None);
                };
                if shutdown.is_cancelled() {
                    return (season, None);
                }
                match catalog.episodes(&season.id, &locale).await {
                    Ok(episodes) => (season, Some(episodes)),
                    Err(e) => {
                        warn!("episode fetch failed for season {}: {}", season.id, e);
                        metrics::SEASON_FETCH_FAILURES.inc();
                        (season, None)
                    }
                }
            }
        });

        let results = join_all(fetches).await;

        let mut records = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (season, episodes) in results {
            let mut record = SeasonRecord::from(season);
            match episodes {
                Some(list) => {
                    record.episodes = list.into_iter().map(EpisodeRecord::from).collect();
                }
                None => failed += 1,
            }
            records.push(record);
        }

        (records, failed)
    }

    /// Fetch a movie's episode by id and graft it into the aggregate. Any
    /// failure is skipped silently: the aggregate still saves without it.
    async fn graft_extra_episode(
        &self,
        aggregate: &mut TitleMetadata,
        extra: &ExtraEpisode,
        locale: &str,
    ) {
        if aggregate.contains_episode(&extra.episode_id) {
            return;
        }

        let listing = match self.catalog.episode_by_id(&extra.episode_id, locale).await {
            Ok(Lookup::Found(listing)) => listing,
            Ok(Lookup::NotFound) => {
                debug!("extra episode {} not found in catalog", extra.episode_id);
                return;
            }
            Err(e) => {
                debug!("extra episode {} fetch failed: {}", extra.episode_id, e);
                return;
            }
        };

        let season_id = if listing.season_id.is_empty() {
            extra.season_id.clone()
        } else {
            listing.season_id.clone()
        };
        let record = EpisodeRecord::from(listing);

        match aggregate.season_mut(&season_id) {
            Some(season) => merge::merge_episode(season, record),
            None => {
                // The owning season was never discovered: carry a stub so the
                // episode has a home. Its display fields fill in on the next
                // full scrape that sees the season.
                metrics::SEASONS_APPENDED.inc();
                metrics::EPISODES_APPENDED.inc();
                aggregate.seasons.push(SeasonRecord {
                    external_id: season_id,
                    title: String::new(),
                    slug_title: String::new(),
                    season_number: 0,
                    sequence_number: 0,
                    display_number: String::new(),
                    identifier: String::new(),
                    episodes: vec![record],
                });
            }
        }
    }

    async fn aggregate_lock(&self, title_id: &str, locale: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((title_id.to_string(), locale.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
