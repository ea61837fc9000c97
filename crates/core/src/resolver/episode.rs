//! Episode id resolution.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogClient, Lookup};
use crate::library::{ItemKind, LibraryError, LibraryItem, MediaStore};
use crate::metrics;
use crate::shutdown::ShutdownToken;

use super::hooks::{run_hooks, PostIdHook};
use super::ResolveOutcome;

/// Resolves remote episode ids for the episode children of a season.
///
/// The remote lookup is keyed by season id plus the 1-based episode ordinal
/// rendered as a string.
pub struct EpisodeResolver {
    catalog: Arc<dyn CatalogClient>,
    library: Arc<dyn MediaStore>,
    hooks: Vec<Arc<dyn PostIdHook>>,
}

impl EpisodeResolver {
    /// Creates a new episode resolver.
    pub fn new(catalog: Arc<dyn CatalogClient>, library: Arc<dyn MediaStore>) -> Self {
        Self {
            catalog,
            library,
            hooks: Vec::new(),
        }
    }

    /// Register the post-id hooks, invoked in order after every visit.
    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn PostIdHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Resolve ids for every episode child of the given season.
    ///
    /// Episodes are processed independently: a failure on one does not block
    /// the others. Hooks run for every visited episode, whatever the outcome.
    pub async fn resolve_children(
        &self,
        season_id: Uuid,
        shutdown: &ShutdownToken,
    ) -> Result<Vec<(Uuid, ResolveOutcome)>, LibraryError> {
        let season = self
            .library
            .item(season_id)
            .await?
            .ok_or(LibraryError::NotFound(season_id))?;

        let remote_season_id = season.provider_ids.season_id().map(str::to_string);
        let episodes = self.library.children(season_id).await?;

        let mut outcomes = Vec::new();
        for mut episode in episodes
            .into_iter()
            .filter(|c| c.kind == ItemKind::Episode)
        {
            let outcome = self
                .resolve_episode(remote_season_id.as_deref(), &mut episode, shutdown)
                .await?;

            run_hooks(&self.hooks, &episode).await;
            metrics::RESOLVE_OUTCOMES
                .with_label_values(&["episode", outcome.as_label()])
                .inc();
            outcomes.push((episode.id, outcome));
        }

        Ok(outcomes)
    }

    async fn resolve_episode(
        &self,
        remote_season_id: Option<&str>,
        episode: &mut LibraryItem,
        shutdown: &ShutdownToken,
    ) -> Result<ResolveOutcome, LibraryError> {
        if episode.provider_ids.episode_id().is_some() {
            debug!("episode {} already has an episode id marker", episode.id);
            return Ok(ResolveOutcome::Skipped);
        }

        // An unresolved or not-found season propagates down without any
        // network calls.
        let Some(season_id) = remote_season_id.filter(|id| !id.is_empty()) else {
            debug!("season unresolved; skipping episode {}", episode.id);
            return Ok(ResolveOutcome::Skipped);
        };

        // The positional lookup needs the ordinal; without one there is no
        // key to query with.
        let Some(ordinal) = episode.index_number else {
            debug!("episode {} has no ordinal, skipping", episode.id);
            return Ok(ResolveOutcome::Skipped);
        };

        if shutdown.is_cancelled() {
            return Ok(ResolveOutcome::Failed);
        }

        let ordinal = ordinal.to_string();

        match self
            .catalog
            .episode_id_by_position(season_id, &ordinal)
            .await
        {
            Ok(Lookup::Found(found)) => {
                info!(
                    "resolved episode {} at position {} -> {}",
                    episode.id, ordinal, found.id
                );
                episode.provider_ids.set_episode_id(found.id);
                episode.provider_ids.set_episode_slug(found.slug_title);
                self.library.update_item(episode).await?;
                Ok(ResolveOutcome::Assigned)
            }
            Ok(Lookup::NotFound) => {
                debug!("no catalog episode at position {} of {}", ordinal, season_id);
                episode.provider_ids.set_episode_id("");
                episode.provider_ids.set_episode_slug("");
                self.library.update_item(episode).await?;
                Ok(ResolveOutcome::NotFound)
            }
            Err(e) => {
                warn!(
                    "episode lookup failed at position {} of {}: {}",
                    ordinal, season_id, e
                );
                Ok(ResolveOutcome::Failed)
            }
        }
    }
}
