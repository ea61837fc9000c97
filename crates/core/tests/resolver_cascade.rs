//! Resolver cascade integration tests.
//!
//! These tests verify the title/season/episode resolvers against the mock
//! catalog and the in-memory media store:
//! - Idempotence (no network calls for already-marked items)
//! - Empty-sentinel writes on definitive not-found
//! - Two-stage season cascade and duplicate tie-breaking
//! - Hook fan-out on every visit, including failures and skips

use std::sync::Arc;

use rollarr_core::resolver::{
    EpisodeResolver, PostIdHook, ResolveOutcome, SeasonResolver, TitleResolver,
};
use rollarr_core::shutdown::{ShutdownController, ShutdownToken};
use rollarr_core::testing::{fixtures, MockCatalog, RecordingHook};
use rollarr_core::{CatalogError, ItemKind, LibraryItem, MediaStore, MemoryMediaStore};
use uuid::Uuid;

/// Test helper wiring resolvers to a mock catalog and in-memory library.
struct TestHarness {
    catalog: Arc<MockCatalog>,
    library: Arc<MemoryMediaStore>,
    hook: Arc<RecordingHook>,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            catalog: Arc::new(MockCatalog::new()),
            library: Arc::new(MemoryMediaStore::new()),
            hook: Arc::new(RecordingHook::new()),
        }
    }

    fn hooks(&self) -> Vec<Arc<dyn PostIdHook>> {
        vec![Arc::clone(&self.hook) as Arc<dyn PostIdHook>]
    }

    fn title_resolver(&self) -> TitleResolver {
        TitleResolver::new(
            Arc::clone(&self.catalog) as _,
            Arc::clone(&self.library) as _,
            "en-US",
        )
        .with_hooks(self.hooks())
    }

    fn season_resolver(&self) -> SeasonResolver {
        SeasonResolver::new(
            Arc::clone(&self.catalog) as _,
            Arc::clone(&self.library) as _,
            "en-US",
        )
        .with_hooks(self.hooks())
    }

    fn episode_resolver(&self) -> EpisodeResolver {
        EpisodeResolver::new(
            Arc::clone(&self.catalog) as _,
            Arc::clone(&self.library) as _,
        )
        .with_hooks(self.hooks())
    }

    async fn insert(&self, item: LibraryItem) -> Uuid {
        let id = item.id;
        self.library.insert(item).await;
        id
    }

    async fn item(&self, id: Uuid) -> LibraryItem {
        self.library.item(id).await.unwrap().unwrap()
    }
}

fn token() -> ShutdownToken {
    ShutdownToken::none()
}

// ============================================================================
// Title resolution
// ============================================================================

#[tokio::test]
async fn title_search_assigns_id_and_slug() {
    let h = TestHarness::new();
    h.catalog
        .add_title(fixtures::title_hit("T1", "Cowboy Bebop"))
        .await;

    let id = h
        .insert(fixtures::series_item("Cowboy Bebop (1998) [tvdbid-76885]"))
        .await;

    let outcome = h.title_resolver().resolve(id, &token()).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::Assigned);

    let item = h.item(id).await;
    assert_eq!(item.provider_ids.series_id(), Some("T1"));
    assert_eq!(item.provider_ids.series_slug(), Some("cowboy-bebop"));
    assert_eq!(h.hook.visit_count().await, 1);
}

#[tokio::test]
async fn title_not_found_writes_empty_sentinels() {
    let h = TestHarness::new();

    let id = h.insert(fixtures::series_item("Unknown Show")).await;

    let outcome = h.title_resolver().resolve(id, &token()).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::NotFound);

    let item = h.item(id).await;
    assert_eq!(item.provider_ids.series_id(), Some(""));
    assert_eq!(item.provider_ids.series_slug(), Some(""));
}

#[tokio::test]
async fn title_resolution_is_idempotent() {
    let h = TestHarness::new();
    h.catalog
        .add_title(fixtures::title_hit("T1", "Cowboy Bebop"))
        .await;

    let id = h.insert(fixtures::series_item("Cowboy Bebop")).await;
    let resolver = h.title_resolver();

    resolver.resolve(id, &token()).await.unwrap();
    let calls_after_first = h.catalog.query_count().await;

    let outcome = resolver.resolve(id, &token()).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::Skipped);
    assert_eq!(h.catalog.query_count().await, calls_after_first);

    // Hooks still ran on the fast path.
    assert_eq!(h.hook.visit_count().await, 2);
}

#[tokio::test]
async fn title_empty_sentinel_is_not_retried() {
    let h = TestHarness::new();
    let id = h.insert(fixtures::series_item("Unknown Show")).await;
    let resolver = h.title_resolver();

    resolver.resolve(id, &token()).await.unwrap();
    let calls_after_first = h.catalog.query_count().await;

    let outcome = resolver.resolve(id, &token()).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::Skipped);
    assert_eq!(h.catalog.query_count().await, calls_after_first);
}

#[tokio::test]
async fn title_transport_failure_leaves_item_retriable() {
    let h = TestHarness::new();
    h.catalog
        .add_title(fixtures::title_hit("T1", "Cowboy Bebop"))
        .await;
    h.catalog
        .set_next_error(CatalogError::RateLimitExceeded)
        .await;

    let id = h.insert(fixtures::series_item("Cowboy Bebop")).await;
    let resolver = h.title_resolver();

    let outcome = resolver.resolve(id, &token()).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::Failed);

    // Nothing written: the bag has no marker at all.
    let item = h.item(id).await;
    assert_eq!(item.provider_ids.series_id(), None);
    // Hooks ran despite the failure.
    assert_eq!(h.hook.visit_count().await, 1);

    // Next run retries and succeeds.
    let outcome = resolver.resolve(id, &token()).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::Assigned);
}

#[tokio::test]
async fn movie_resolves_like_a_series() {
    let h = TestHarness::new();
    h.catalog
        .add_title(fixtures::title_hit("M1", "Perfect Blue"))
        .await;

    let id = h.insert(fixtures::movie_item("Perfect Blue (1997)")).await;

    let outcome = h.title_resolver().resolve(id, &token()).await.unwrap();
    assert_eq!(outcome, ResolveOutcome::Assigned);
    assert_eq!(h.item(id).await.provider_ids.series_id(), Some("M1"));
}

#[tokio::test]
async fn cancelled_title_resolution_issues_no_calls() {
    let h = TestHarness::new();
    let id = h.insert(fixtures::series_item("Cowboy Bebop")).await;

    let controller = ShutdownController::new();
    let cancel_token = controller.token();
    controller.shutdown();

    let outcome = h
        .title_resolver()
        .resolve(id, &cancel_token)
        .await
        .unwrap();
    assert_eq!(outcome, ResolveOutcome::Failed);
    assert_eq!(h.catalog.query_count().await, 0);
    assert_eq!(h.item(id).await.provider_ids.series_id(), None);
}

// ============================================================================
// Season resolution
// ============================================================================

/// Series with a resolved title id and the given season folders.
async fn seeded_series(h: &TestHarness, seasons: &[(u32, &str)]) -> (Uuid, Vec<Uuid>) {
    let mut series = fixtures::series_item("Show");
    series.provider_ids.set_series_id("T1");
    series.provider_ids.set_series_slug("show");
    let series_id = series.id;
    h.library.insert(series).await;

    let mut season_ids = Vec::new();
    for (number, name) in seasons {
        let season = fixtures::season_item(series_id, *number, name);
        season_ids.push(season.id);
        h.library.insert(season).await;
    }
    (series_id, season_ids)
}

#[tokio::test]
async fn season_resolves_by_descriptive_name() {
    let h = TestHarness::new();
    h.catalog
        .add_season("T1", fixtures::season_listing("S1", 1, "The Final Act"))
        .await;

    let (series_id, season_ids) = seeded_series(&h, &[(1, "The Final Act")]).await;

    let outcomes = h
        .season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();
    assert_eq!(outcomes, vec![(season_ids[0], ResolveOutcome::Assigned)]);
    assert_eq!(h.item(season_ids[0]).await.provider_ids.season_id(), Some("S1"));
}

#[tokio::test]
async fn generic_season_name_skips_stage_a() {
    let h = TestHarness::new();
    h.catalog
        .add_season("T1", fixtures::season_listing("S2", 2, "Second Season"))
        .await;

    let (series_id, season_ids) = seeded_series(&h, &[(2, "Season 2")]).await;

    h.season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();

    // Only the by-number lookup ran; "Season 2" carries no name signal.
    let queries = h.catalog.recorded_queries().await;
    assert!(queries.iter().all(|q| !matches!(
        q,
        rollarr_core::testing::RecordedQuery::SeasonIdByName { .. }
    )));
    assert_eq!(h.item(season_ids[0]).await.provider_ids.season_id(), Some("S2"));
}

#[tokio::test]
async fn duplicate_season_numbers_get_distinct_ids() {
    let h = TestHarness::new();
    // Two remote seasons share number 1 (broadcast cut and director's cut).
    h.catalog
        .add_season("T1", fixtures::season_listing("S1A", 1, "Cut A"))
        .await;
    h.catalog
        .add_season("T1", fixtures::season_listing("S1B", 1, "Cut B"))
        .await;

    let (series_id, season_ids) =
        seeded_series(&h, &[(1, "Season 1"), (1, "Season 1")]).await;

    let outcomes = h
        .season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();

    assert!(outcomes.iter().all(|(_, o)| *o == ResolveOutcome::Assigned));
    let first = h.item(season_ids[0]).await;
    let second = h.item(season_ids[1]).await;
    assert_eq!(first.provider_ids.season_id(), Some("S1A"));
    assert_eq!(second.provider_ids.season_id(), Some("S1B"));
}

#[tokio::test]
async fn unresolved_series_skips_seasons_without_network() {
    let h = TestHarness::new();

    let mut series = fixtures::series_item("Show");
    // Empty sentinel: the series was looked up and not found.
    series.provider_ids.set_series_id("");
    let series_id = series.id;
    h.library.insert(series).await;
    let season = fixtures::season_item(series_id, 1, "Season 1");
    let season_id = season.id;
    h.library.insert(season).await;

    let outcomes = h
        .season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes, vec![(season_id, ResolveOutcome::Skipped)]);
    assert_eq!(h.catalog.query_count().await, 0);
    // Hooks observed the visit anyway.
    assert_eq!(h.hook.visited().await, vec![season_id]);
}

#[tokio::test]
async fn stage_b_not_found_writes_empty_sentinel() {
    let h = TestHarness::new();
    // Remote has no season numbered 5.
    h.catalog
        .add_season("T1", fixtures::season_listing("S1", 1, "First"))
        .await;

    let (series_id, season_ids) = seeded_series(&h, &[(5, "Season 5")]).await;

    let outcomes = h
        .season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes, vec![(season_ids[0], ResolveOutcome::NotFound)]);
    assert_eq!(h.item(season_ids[0]).await.provider_ids.season_id(), Some(""));
}

#[tokio::test]
async fn stage_a_not_found_then_stage_b_failure_leaves_season_unresolved() {
    let h = TestHarness::new();
    // The descriptive name matches nothing, so Stage A answers NotFound;
    // Stage B then fails with a transport error.
    h.catalog
        .add_season("T1", fixtures::season_listing("S1", 1, "First"))
        .await;
    h.catalog.fail_season_number_lookups(true).await;

    let (series_id, season_ids) = seeded_series(&h, &[(1, "The Lost Arc")]).await;

    let outcomes = h
        .season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes, vec![(season_ids[0], ResolveOutcome::Failed)]);
    // No provider id written: eligible for retry next run.
    assert_eq!(h.item(season_ids[0]).await.provider_ids.season_id(), None);
    // Hooks were still invoked exactly once.
    assert_eq!(h.hook.visited().await, vec![season_ids[0]]);
}

#[tokio::test]
async fn failing_season_does_not_block_siblings() {
    let h = TestHarness::new();
    h.catalog
        .add_season("T1", fixtures::season_listing("S1", 1, "First"))
        .await;
    h.catalog
        .add_season("T1", fixtures::season_listing("S2", 2, "Second"))
        .await;
    // Fail the first season's Stage A lookup only.
    h.catalog
        .set_next_error(CatalogError::RateLimitExceeded)
        .await;

    let (series_id, season_ids) =
        seeded_series(&h, &[(1, "Some Arc"), (2, "Second")]).await;

    let outcomes = h
        .season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes[0], (season_ids[0], ResolveOutcome::Failed));
    assert_eq!(outcomes[1], (season_ids[1], ResolveOutcome::Assigned));
}

#[tokio::test]
async fn resolved_seasons_are_skipped_without_network() {
    let h = TestHarness::new();
    h.catalog
        .add_season("T1", fixtures::season_listing("S1", 1, "First"))
        .await;

    let (series_id, _) = seeded_series(&h, &[(1, "First")]).await;
    let resolver = h.season_resolver();

    resolver.resolve_children(series_id, &token()).await.unwrap();
    let calls_after_first = h.catalog.query_count().await;

    let outcomes = resolver
        .resolve_children(series_id, &token())
        .await
        .unwrap();
    assert!(outcomes.iter().all(|(_, o)| *o == ResolveOutcome::Skipped));
    assert_eq!(h.catalog.query_count().await, calls_after_first);
}

// ============================================================================
// Episode resolution
// ============================================================================

/// Season with a resolved season id and the given episode ordinals.
async fn seeded_season(h: &TestHarness, episodes: &[Option<u32>]) -> (Uuid, Vec<Uuid>) {
    let mut season = fixtures::season_item(Uuid::new_v4(), 1, "Season 1");
    season.parent_id = None;
    season.provider_ids.set_season_id("S1");
    let season_id = season.id;
    h.library.insert(season).await;

    let mut episode_ids = Vec::new();
    for (position, ordinal) in episodes.iter().enumerate() {
        let mut episode = fixtures::episode_item(season_id, position as u32 + 1);
        episode.index_number = *ordinal;
        episode_ids.push(episode.id);
        h.library.insert(episode).await;
    }
    (season_id, episode_ids)
}

#[tokio::test]
async fn episode_resolves_by_position() {
    let h = TestHarness::new();
    h.catalog
        .add_episode("S1", fixtures::episode_listing("E1", "1"))
        .await;
    h.catalog
        .add_episode("S1", fixtures::episode_listing("E2", "2"))
        .await;

    let (season_id, episode_ids) = seeded_season(&h, &[Some(1), Some(2)]).await;

    let outcomes = h
        .episode_resolver()
        .resolve_children(season_id, &token())
        .await
        .unwrap();

    assert!(outcomes.iter().all(|(_, o)| *o == ResolveOutcome::Assigned));
    let first = h.item(episode_ids[0]).await;
    assert_eq!(first.provider_ids.episode_id(), Some("E1"));
    assert_eq!(first.provider_ids.episode_slug(), Some("episode-1"));
}

#[tokio::test]
async fn episode_not_found_writes_empty_sentinels() {
    let h = TestHarness::new();
    // Season exists remotely but has no episode at position 7.
    h.catalog
        .add_episode("S1", fixtures::episode_listing("E1", "1"))
        .await;

    let (season_id, episode_ids) = seeded_season(&h, &[Some(7)]).await;

    let outcomes = h
        .episode_resolver()
        .resolve_children(season_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes, vec![(episode_ids[0], ResolveOutcome::NotFound)]);
    let item = h.item(episode_ids[0]).await;
    assert_eq!(item.provider_ids.episode_id(), Some(""));
    assert_eq!(item.provider_ids.episode_slug(), Some(""));
}

#[tokio::test]
async fn episode_without_ordinal_is_skipped() {
    let h = TestHarness::new();
    h.catalog
        .add_episode("S1", fixtures::episode_listing("E1", "1"))
        .await;

    let (season_id, episode_ids) = seeded_season(&h, &[None]).await;

    let outcomes = h
        .episode_resolver()
        .resolve_children(season_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes, vec![(episode_ids[0], ResolveOutcome::Skipped)]);
    assert_eq!(h.catalog.query_count().await, 0);
    // The hook still observed the visit.
    assert_eq!(h.hook.visit_count().await, 1);
}

#[tokio::test]
async fn unresolved_season_skips_episodes_without_network() {
    let h = TestHarness::new();

    let mut season = fixtures::season_item(Uuid::new_v4(), 1, "Season 1");
    season.parent_id = None;
    season.provider_ids.set_season_id("");
    let season_id = season.id;
    h.library.insert(season).await;
    let episode = fixtures::episode_item(season_id, 1);
    let episode_id = episode.id;
    h.library.insert(episode).await;

    let outcomes = h
        .episode_resolver()
        .resolve_children(season_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes, vec![(episode_id, ResolveOutcome::Skipped)]);
    assert_eq!(h.catalog.query_count().await, 0);
}

#[tokio::test]
async fn episode_transport_failure_does_not_block_siblings() {
    let h = TestHarness::new();
    h.catalog
        .add_episode("S1", fixtures::episode_listing("E1", "1"))
        .await;
    h.catalog
        .add_episode("S1", fixtures::episode_listing("E2", "2"))
        .await;
    h.catalog
        .set_next_error(CatalogError::RateLimitExceeded)
        .await;

    let (season_id, episode_ids) = seeded_season(&h, &[Some(1), Some(2)]).await;

    let outcomes = h
        .episode_resolver()
        .resolve_children(season_id, &token())
        .await
        .unwrap();

    assert_eq!(outcomes[0], (episode_ids[0], ResolveOutcome::Failed));
    assert_eq!(outcomes[1], (episode_ids[1], ResolveOutcome::Assigned));
    // The failed episode wrote nothing and stays retriable.
    assert_eq!(h.item(episode_ids[0]).await.provider_ids.episode_id(), None);
}

// ============================================================================
// Cross-kind checks
// ============================================================================

#[tokio::test]
async fn non_season_children_are_ignored_by_season_resolver() {
    let h = TestHarness::new();

    let mut series = fixtures::series_item("Show");
    series.provider_ids.set_series_id("T1");
    let series_id = series.id;
    h.library.insert(series).await;

    // A stray episode directly under the series must not be treated as a season.
    let mut stray = LibraryItem::new(ItemKind::Episode, "Stray");
    stray.parent_id = Some(series_id);
    h.library.insert(stray).await;

    let outcomes = h
        .season_resolver()
        .resolve_children(series_id, &token())
        .await
        .unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(h.catalog.query_count().await, 0);
}
