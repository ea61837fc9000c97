//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - ID resolvers (title, season, episode outcomes)
//! - Post-id hook fan-out
//! - Scrape engine (runs, merges, durations)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Resolver Metrics
// =============================================================================

/// Resolver outcomes by item kind and result.
pub static RESOLVE_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rollarr_resolve_outcomes_total", "Total resolver outcomes"),
        &["kind", "outcome"], // outcome: "assigned", "not_found", "skipped", "failed"
    )
    .unwrap()
});

/// Duplicate season-number collisions disambiguated by the counter.
pub static SEASON_DUPLICATES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rollarr_season_duplicates_total",
        "Season-number collisions resolved via the duplicate counter",
    )
    .unwrap()
});

/// Post-id-set hook invocations by result.
pub static HOOK_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rollarr_hook_invocations_total",
            "Total post-id-set hook invocations",
        ),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

// =============================================================================
// Scrape Engine Metrics
// =============================================================================

/// Scrape runs by result.
pub static SCRAPES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rollarr_scrapes_total", "Total scrape runs"),
        &["result"], // "success", "failed", "cancelled"
    )
    .unwrap()
});

/// Scrape run duration in seconds.
pub static SCRAPE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "rollarr_scrape_duration_seconds",
            "Duration of full scrape runs",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

/// Seasons appended to aggregates during merge.
pub static SEASONS_APPENDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rollarr_seasons_appended_total",
        "Seasons newly appended to persisted aggregates",
    )
    .unwrap()
});

/// Episodes appended to aggregates during merge.
pub static EPISODES_APPENDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rollarr_episodes_appended_total",
        "Episodes newly appended to persisted aggregates",
    )
    .unwrap()
});

/// Per-season episode fetches that failed and degraded to an empty list.
pub static SEASON_FETCH_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "rollarr_season_fetch_failures_total",
        "Season episode fetches that failed within an otherwise successful scrape",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Resolvers
        Box::new(RESOLVE_OUTCOMES.clone()),
        Box::new(SEASON_DUPLICATES.clone()),
        Box::new(HOOK_INVOCATIONS.clone()),
        // Scrape engine
        Box::new(SCRAPES_TOTAL.clone()),
        Box::new(SCRAPE_DURATION.clone()),
        Box::new(SEASONS_APPENDED.clone()),
        Box::new(EPISODES_APPENDED.clone()),
        Box::new(SEASON_FETCH_FAILURES.clone()),
    ]
}
