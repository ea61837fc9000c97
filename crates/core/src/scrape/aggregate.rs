//! Persisted metadata aggregate entities.
//!
//! One `TitleMetadata` tree is kept per `(external_id, locale)` pair. The
//! tree only ever grows: seasons and episodes that disappear from the remote
//! catalog stay in the aggregate, because later pipeline stages hang their
//! own provider ids off these rows and pruning would discard them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{EpisodeListing, ImageSource, SeasonListing};

/// Root of the persisted metadata tree for one title and locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleMetadata {
    /// Aggregate identity, assigned on first creation.
    pub id: Uuid,
    /// Remote title id. Immutable once created.
    pub external_id: String,
    /// Locale the prose fields were fetched in.
    pub locale: String,
    /// Series title.
    pub title: String,
    /// URL slug for the series.
    pub slug_title: String,
    /// Series synopsis.
    pub description: String,
    /// Producing studio.
    pub studio: String,
    /// Aggregate user rating; 0 when the rating fetch failed.
    pub rating: f32,
    /// Portrait poster renditions.
    pub poster_tall: Vec<ImageSource>,
    /// Landscape poster renditions.
    pub poster_wide: Vec<ImageSource>,
    /// Seasons, in first-seen order.
    pub seasons: Vec<SeasonRecord>,
    /// When the aggregate was first created.
    pub created_at: DateTime<Utc>,
    /// When the aggregate was last merged into.
    pub updated_at: DateTime<Utc>,
}

/// A season within an aggregate. External id is unique per aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    /// Remote season id.
    pub external_id: String,
    /// Season title.
    pub title: String,
    /// URL slug for the season.
    pub slug_title: String,
    /// Season number (not unique: alternate cuts share numbers).
    pub season_number: u32,
    /// Catalog-assigned position within the title.
    pub sequence_number: u32,
    /// Human-facing display number.
    pub display_number: String,
    /// Opaque catalog identifier string.
    pub identifier: String,
    /// Episodes, in first-seen order. External id is unique per season.
    pub episodes: Vec<EpisodeRecord>,
}

/// An episode within a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Remote episode id.
    pub external_id: String,
    /// Episode title.
    pub title: String,
    /// URL slug for the episode.
    pub slug_title: String,
    /// Episode synopsis.
    pub description: String,
    /// Ordinal as the catalog prints it.
    pub ordinal: String,
    /// Numeric episode number, when the ordinal is a plain integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    /// Catalog-assigned position within the season.
    pub sequence_number: u32,
    /// Thumbnail renditions.
    #[serde(default)]
    pub thumbnails: Vec<ImageSource>,
}

impl TitleMetadata {
    /// Create an empty aggregate with a fresh identity.
    pub fn new(external_id: impl Into<String>, locale: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            external_id: external_id.into(),
            locale: locale.into(),
            title: String::new(),
            slug_title: String::new(),
            description: String::new(),
            studio: String::new(),
            rating: 0.0,
            poster_tall: Vec::new(),
            poster_wide: Vec::new(),
            seasons: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a season by its remote id.
    pub fn season(&self, external_id: &str) -> Option<&SeasonRecord> {
        self.seasons.iter().find(|s| s.external_id == external_id)
    }

    /// Find a season by its remote id, mutably.
    pub fn season_mut(&mut self, external_id: &str) -> Option<&mut SeasonRecord> {
        self.seasons
            .iter_mut()
            .find(|s| s.external_id == external_id)
    }

    /// True if any season contains the given episode id.
    pub fn contains_episode(&self, episode_id: &str) -> bool {
        self.seasons
            .iter()
            .any(|s| s.episodes.iter().any(|e| e.external_id == episode_id))
    }

    /// Total number of episodes across all seasons.
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

impl SeasonRecord {
    /// True if the season contains the given episode id.
    pub fn contains_episode(&self, episode_id: &str) -> bool {
        self.episodes.iter().any(|e| e.external_id == episode_id)
    }
}

impl From<SeasonListing> for SeasonRecord {
    fn from(s: SeasonListing) -> Self {
        Self {
            external_id: s.id,
            title: s.title,
            slug_title: s.slug_title,
            season_number: s.season_number,
            sequence_number: s.sequence_number,
            display_number: s.display_number,
            identifier: s.identifier,
            episodes: Vec::new(),
        }
    }
}

impl From<EpisodeListing> for EpisodeRecord {
    fn from(e: EpisodeListing) -> Self {
        Self {
            external_id: e.id,
            title: e.title,
            slug_title: e.slug_title,
            description: e.description,
            ordinal: e.ordinal,
            episode_number: e.episode_number,
            sequence_number: e.sequence_number,
            thumbnails: e.thumbnails,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str) -> EpisodeRecord {
        EpisodeRecord {
            external_id: id.to_string(),
            title: format!("Episode {}", id),
            slug_title: String::new(),
            description: String::new(),
            ordinal: "1".to_string(),
            episode_number: Some(1),
            sequence_number: 1,
            thumbnails: Vec::new(),
        }
    }

    #[test]
    fn test_new_aggregate_is_empty() {
        let aggregate = TitleMetadata::new("T1", "en-US");
        assert_eq!(aggregate.external_id, "T1");
        assert!(aggregate.seasons.is_empty());
        assert_eq!(aggregate.episode_count(), 0);
        assert_eq!(aggregate.rating, 0.0);
    }

    #[test]
    fn test_contains_episode_scans_all_seasons() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        aggregate.seasons.push(SeasonRecord {
            external_id: "S1".to_string(),
            title: String::new(),
            slug_title: String::new(),
            season_number: 1,
            sequence_number: 1,
            display_number: String::new(),
            identifier: String::new(),
            episodes: vec![episode("E1")],
        });
        aggregate.seasons.push(SeasonRecord {
            external_id: "S2".to_string(),
            title: String::new(),
            slug_title: String::new(),
            season_number: 2,
            sequence_number: 2,
            display_number: String::new(),
            identifier: String::new(),
            episodes: vec![episode("E2")],
        });

        assert!(aggregate.contains_episode("E1"));
        assert!(aggregate.contains_episode("E2"));
        assert!(!aggregate.contains_episode("E3"));
        assert_eq!(aggregate.episode_count(), 2);
    }

    #[test]
    fn test_season_lookup() {
        let mut aggregate = TitleMetadata::new("T1", "en-US");
        aggregate.seasons.push(SeasonRecord {
            external_id: "S1".to_string(),
            title: "First".to_string(),
            slug_title: String::new(),
            season_number: 1,
            sequence_number: 1,
            display_number: String::new(),
            identifier: String::new(),
            episodes: Vec::new(),
        });

        assert_eq!(aggregate.season("S1").unwrap().title, "First");
        assert!(aggregate.season("S9").is_none());
    }
}
