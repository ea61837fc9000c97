//! Season id resolution.
//!
//! Seasons resolve through a two-stage cascade. Stage A looks the season up
//! by its folder name, which catches descriptive folders like "The Final
//! Act"; a purely generic "Season 3" folder carries no signal and goes
//! straight to Stage B. Stage B looks the season up by number with a
//! duplicate counter: the catalog can list several seasons under one number
//! (alternate cuts, dubs), and the counter hands them out in first-seen
//! order so colliding local seasons get distinct remote ids.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogClient, Lookup};
use crate::library::{names, ItemKind, LibraryError, LibraryItem, MediaStore};
use crate::metrics;
use crate::shutdown::ShutdownToken;

use super::hooks::{run_hooks, PostIdHook};
use super::ResolveOutcome;

/// Resolves remote season ids for the season children of a series.
pub struct SeasonResolver {
    catalog: Arc<dyn CatalogClient>,
    library: Arc<dyn MediaStore>,
    hooks: Vec<Arc<dyn PostIdHook>>,
    default_locale: String,
}

impl SeasonResolver {
    /// Creates a new season resolver.
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        library: Arc<dyn MediaStore>,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            library,
            hooks: Vec::new(),
            default_locale: default_locale.into(),
        }
    }

    /// Register the post-id hooks, invoked in order after every visit.
    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn PostIdHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Resolve ids for every season child of the given series.
    ///
    /// Seasons are processed independently: a failure on one does not block
    /// the others. Hooks run for every visited season, whatever the outcome.
    pub async fn resolve_children(
        &self,
        series_id: Uuid,
        shutdown: &ShutdownToken,
    ) -> Result<Vec<(Uuid, ResolveOutcome)>, LibraryError> {
        let series = self
            .library
            .item(series_id)
            .await?
            .ok_or(LibraryError::NotFound(series_id))?;

        let remote_series_id = series.provider_ids.series_id().map(str::to_string);
        let seasons = self.library.children(series_id).await?;

        // The counter disambiguates colliding season numbers within this run,
        // in first-seen order.
        let mut duplicate_counters: HashMap<u32, u32> = HashMap::new();
        let mut outcomes = Vec::new();

        for mut season in seasons
            .into_iter()
            .filter(|c| c.kind == ItemKind::Season)
        {
            let outcome = self
                .resolve_season(
                    remote_series_id.as_deref(),
                    &mut season,
                    &mut duplicate_counters,
                    shutdown,
                )
                .await?;

            run_hooks(&self.hooks, &season).await;
            metrics::RESOLVE_OUTCOMES
                .with_label_values(&["season", outcome.as_label()])
                .inc();
            outcomes.push((season.id, outcome));
        }

        Ok(outcomes)
    }

    async fn resolve_season(
        &self,
        remote_series_id: Option<&str>,
        season: &mut LibraryItem,
        duplicate_counters: &mut HashMap<u32, u32>,
        shutdown: &ShutdownToken,
    ) -> Result<ResolveOutcome, LibraryError> {
        if season.provider_ids.season_id().is_some() {
            debug!("season {} already has a season id marker", season.id);
            return Ok(ResolveOutcome::Skipped);
        }

        // An unresolved or not-found series propagates down the tree without
        // any network calls.
        let Some(series_id) = remote_series_id.filter(|id| !id.is_empty()) else {
            debug!("series unresolved; skipping season {}", season.id);
            return Ok(ResolveOutcome::Skipped);
        };

        if shutdown.is_cancelled() {
            return Ok(ResolveOutcome::Failed);
        }

        let locale = season.locale_or(&self.default_locale).to_string();
        let base_name = names::season_base_name(&season.name);

        // Stage A: by name, unless the folder name is generic.
        if !names::is_generic_season_name(&base_name) {
            match self
                .catalog
                .season_id_by_name(series_id, &base_name, &locale)
                .await
            {
                Ok(Lookup::Found(id)) => {
                    info!("resolved season '{}' by name -> {}", base_name, id);
                    season.provider_ids.set_season_id(id);
                    self.library.update_item(season).await?;
                    return Ok(ResolveOutcome::Assigned);
                }
                Ok(Lookup::NotFound) => {
                    debug!("season '{}' not found by name, trying by number", base_name);
                }
                Err(e) => {
                    warn!("season-by-name lookup failed for '{}': {}", base_name, e);
                    return Ok(ResolveOutcome::Failed);
                }
            }
        }

        // Stage B: by number with the duplicate counter.
        let Some(number) = season.index_number else {
            debug!("season {} has no ordinal, cannot look up by number", season.id);
            return Ok(ResolveOutcome::Failed);
        };

        if shutdown.is_cancelled() {
            return Ok(ResolveOutcome::Failed);
        }

        let counter = duplicate_counters.get(&number).copied().unwrap_or(0);

        match self
            .catalog
            .season_id_by_number(series_id, number, counter)
            .await
        {
            Ok(Lookup::Found(id)) => {
                if counter > 0 {
                    metrics::SEASON_DUPLICATES.inc();
                }
                // The remote season is consumed; the next local season with
                // this number gets the following one.
                duplicate_counters.insert(number, counter + 1);
                info!(
                    "resolved season {} by number {} (duplicate {}) -> {}",
                    season.id, number, counter, id
                );
                season.provider_ids.set_season_id(id);
                self.library.update_item(season).await?;
                Ok(ResolveOutcome::Assigned)
            }
            Ok(Lookup::NotFound) => {
                debug!("no catalog season for number {} (duplicate {})", number, counter);
                season.provider_ids.set_season_id("");
                self.library.update_item(season).await?;
                Ok(ResolveOutcome::NotFound)
            }
            Err(e) => {
                warn!("season-by-number lookup failed for {}: {}", number, e);
                Ok(ResolveOutcome::Failed)
            }
        }
    }
}
