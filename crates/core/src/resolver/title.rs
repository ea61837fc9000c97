//! Title id resolution for series and movies.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogClient, Lookup};
use crate::library::{LibraryError, LibraryItem, MediaStore};
use crate::metrics;
use crate::shutdown::ShutdownToken;

use super::hooks::{run_hooks, PostIdHook};
use super::ResolveOutcome;

/// Resolves the remote title id for a series or movie by name search.
pub struct TitleResolver {
    catalog: Arc<dyn CatalogClient>,
    library: Arc<dyn MediaStore>,
    hooks: Vec<Arc<dyn PostIdHook>>,
    default_locale: String,
}

impl TitleResolver {
    /// Creates a new title resolver.
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

    /// Resolve the title id for one item.
    ///
    /// Idempotent: an item whose `SeriesId` is already present - including
    /// the empty sentinel - is skipped without a network call. Hooks run for
    /// every visit, whatever the outcome.
    pub async fn resolve(
        &self,
        item_id: Uuid,
        shutdown: &ShutdownToken,
    ) -> Result<ResolveOutcome, LibraryError> {
        let mut item = self
            .library
            .item(item_id)
            .await?
            .ok_or(LibraryError::NotFound(item_id))?;

        let outcome = self.resolve_item(&mut item, shutdown).await?;

        run_hooks(&self.hooks, &item).await;
        metrics::RESOLVE_OUTCOMES
            .with_label_values(&["title", outcome.as_label()])
            .inc();

        Ok(outcome)
    }

    async fn resolve_item(
        &self,
        item: &mut LibraryItem,
        shutdown: &ShutdownToken,
    ) -> Result<ResolveOutcome, LibraryError> {
        if item.provider_ids.series_id().is_some() {
            debug!("item {} already has a series id marker", item.id);
            return Ok(ResolveOutcome::Skipped);
        }

        if shutdown.is_cancelled() {
            return Ok(ResolveOutcome::Failed);
        }

        let query = item.base_name();
        let locale = item.locale_or(&self.default_locale);

        match self.catalog.search_title(&query, locale).await {
            Ok(Lookup::Found(hit)) => {
                info!("resolved title '{}' -> {}", query, hit.id);
                item.provider_ids.set_series_id(hit.id);
                item.provider_ids.set_series_slug(hit.slug_title);
                self.library.update_item(item).await?;
                Ok(ResolveOutcome::Assigned)
            }
            Ok(Lookup::NotFound) => {
                // Permanent marker: resolved, nothing found. Not retried.
                debug!("no catalog match for title '{}'", query);
                item.provider_ids.set_series_id("");
                item.provider_ids.set_series_slug("");
                self.library.update_item(item).await?;
                Ok(ResolveOutcome::NotFound)
            }
            Err(e) => {
                warn!("title search failed for '{}': {}", query, e);
                Ok(ResolveOutcome::Failed)
            }
        }
    }
}
