//! Append-and-overwrite merge of freshly fetched data into an aggregate.
//!
//! The remote catalog reorganizes season and episode numbering between
//! scrapes, so the merge never keys on numbers, only on external ids, and
//! never deletes: a season or episode seen once stays in the aggregate even
//! when later fetches no longer return it. Series-level scalar fields are the
//! opposite - always overwritten from the latest successful fetch.

use chrono::Utc;

use crate::catalog::SeriesInfo;
use crate::metrics;

use super::aggregate::{EpisodeRecord, SeasonRecord, TitleMetadata};

/// Overwrite the series-level scalar fields from a fresh fetch.
pub fn apply_series_info(aggregate: &mut TitleMetadata, info: &SeriesInfo, rating: f32) {
    aggregate.title = info.title.clone();
    aggregate.slug_title = info.slug_title.clone();
    aggregate.description = info.description.clone();
    aggregate.studio = info.studio.clone();
    aggregate.rating = rating;
    aggregate.poster_tall = info.poster_tall.clone();
    aggregate.poster_wide = info.poster_wide.clone();
    aggregate.updated_at = Utc::now();
}

/// Merge one freshly fetched season into the aggregate.
///
/// A season already present (by external id) receives any episodes it does
/// not yet have; its display fields are refreshed in place. An unseen season
/// is appended wholesale. Nothing is ever removed.
pub fn merge_season(aggregate: &mut TitleMetadata, fetched: SeasonRecord) {
    match aggregate.season_mut(&fetched.external_id) {
        Some(existing) => {
            existing.title = fetched.title;
            existing.slug_title = fetched.slug_title;
            existing.season_number = fetched.season_number;
            existing.sequence_number = fetched.sequence_number;
            existing.display_number = fetched.display_number;
            existing.identifier = fetched.identifier;
            for episode in fetched.episodes {
                merge_episode(existing, episode);
            }
        }
        None => {
            metrics::SEASONS_APPENDED.inc();
            metrics::EPISODES_APPENDED.inc_by(fetched.episodes.len() as u64);
            aggregate.seasons.push(fetched);
        }
    }
}

/// Merge one episode into a season; existing episodes are refreshed in
/// place, unseen ones appended.
pub fn merge_episode(season: &mut SeasonRecord, fetched: EpisodeRecord) {
    match season
        .episodes
        .iter_mut()
        .find(|e| e.external_id == fetched.external_id)
    {
        Some(existing) => *existing = fetched,
        None => {
            metrics::EPISODES_APPENDED.inc();
            season.episodes.push(fetched);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageSource;

    fn season(id: &str, number: u32, episodes: Vec<EpisodeRecord>) -> SeasonRecord {
        SeasonRecord {
            external_id: id.to_string(),
            title: format!("Season {}", id),
            slug_title: String::new(),
            season_number: number,
            sequence_number: number,
            display_number: number.to_string(),
            identifier: String::new(),
            episodes,
        }
    }

    fn episode(id: &str, ordinal: &str) -> EpisodeRecord {
        EpisodeRecord {
            external_id: id.to_string(),
            title: format!("Episode {}", id),
            slug_title: String::new(),
            description: String::new(),
            ordinal: ordinal.to_string(),
            episode_number: ordinal.parse().ok(),
            sequence_number: ordinal.parse().unwrap_or(0),
            thumbnails: Vec::new(),
        }
    }

    fn series_info(title: &str) -> SeriesInfo {
        SeriesInfo {
            title: title.to_string(),
            description: format!("About {}", title),
            slug_title: title.to_lowercase().replace(' ', "-"),
            studio: "Studio".to_string(),
            poster_tall: vec![ImageSource {
                url: "https://img.example.test/tall.jpg".to_string(),
                width: 600,
                height: 900,
            }],
            poster_wide: Vec::new(),
        }
    }

    #[test]
    fn test_merge_appends_new_season() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        merge_season(&mut aggregate, season("S1", 1, vec![episode("E1", "1")]));

        assert_eq!(aggregate.seasons.len(), 1);
        assert_eq!(aggregate.seasons[0].episodes.len(), 1);
    }

    #[test]
    fn test_merge_never_deletes_episodes() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        merge_season(
            &mut aggregate,
            season("S1", 1, vec![episode("E1", "1"), episode("E2", "2")]),
        );

        // A later fetch returns only E3; E1 and E2 must survive.
        merge_season(&mut aggregate, season("S1", 1, vec![episode("E3", "3")]));

        let merged = aggregate.season("S1").unwrap();
        assert_eq!(merged.episodes.len(), 3);
        assert!(merged.contains_episode("E1"));
        assert!(merged.contains_episode("E2"));
        assert!(merged.contains_episode("E3"));
    }

    #[test]
    fn test_merge_never_deletes_seasons() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        merge_season(&mut aggregate, season("S1", 1, vec![]));
        merge_season(&mut aggregate, season("S2", 2, vec![]));

        // A later pass only sees S2; S1 must survive untouched.
        merge_season(&mut aggregate, season("S2", 2, vec![episode("E9", "1")]));

        assert_eq!(aggregate.seasons.len(), 2);
        assert!(aggregate.season("S1").is_some());
        assert_eq!(aggregate.season("S2").unwrap().episodes.len(), 1);
    }

    #[test]
    fn test_merge_refreshes_episode_in_place() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        merge_season(&mut aggregate, season("S1", 1, vec![episode("E1", "1")]));

        let mut updated = episode("E1", "1");
        updated.title = "Retitled".to_string();
        merge_season(&mut aggregate, season("S1", 1, vec![updated]));

        let merged = aggregate.season("S1").unwrap();
        assert_eq!(merged.episodes.len(), 1);
        assert_eq!(merged.episodes[0].title, "Retitled");
    }

    #[test]
    fn test_merge_keeps_duplicate_numbers_distinct() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        // Two remote seasons share season_number 1 (alternate cuts).
        merge_season(&mut aggregate, season("S1A", 1, vec![]));
        merge_season(&mut aggregate, season("S1B", 1, vec![]));

        assert_eq!(aggregate.seasons.len(), 2);
        assert!(aggregate.season("S1A").is_some());
        assert!(aggregate.season("S1B").is_some());
    }

    #[test]
    fn test_series_scalars_are_last_write_wins() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        apply_series_info(&mut aggregate, &series_info("Old Title"), 4.2);
        apply_series_info(&mut aggregate, &series_info("New Title"), 4.8);

        assert_eq!(aggregate.title, "New Title");
        assert_eq!(aggregate.description, "About New Title");
        assert_eq!(aggregate.rating, 4.8);
        assert_eq!(aggregate.poster_tall.len(), 1);
    }

    #[test]
    fn test_series_overwrite_does_not_touch_seasons() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        merge_season(&mut aggregate, season("S1", 1, vec![episode("E1", "1")]));
        apply_series_info(&mut aggregate, &series_info("Title"), 0.0);

        assert_eq!(aggregate.seasons.len(), 1);
        assert_eq!(aggregate.episode_count(), 1);
    }
}
