//! Types for remote catalog API responses.

use serde::{Deserialize, Serialize};

/// Outcome payload for catalog lookups that can legitimately find nothing.
///
/// An explicit `NotFound` is a terminal answer from the catalog ("we looked,
/// there is no such thing") and is distinct from a transport or parse failure,
/// which surfaces as a `CatalogError` instead. Callers branch on all three.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The catalog returned a match.
    Found(T),
    /// The catalog answered definitively that there is no match.
    NotFound,
}

impl<T> Lookup<T> {
    /// Returns the contained value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }

    /// True if the lookup produced a match.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// An image served by the catalog, with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Absolute URL of the image.
    pub url: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A title search match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleHit {
    /// Remote title (series/movie) id.
    pub id: String,
    /// URL slug for the title.
    pub slug_title: String,
    /// Display name as the catalog knows it.
    pub name: String,
}

/// A season as listed under a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonListing {
    /// Remote season id.
    pub id: String,
    /// Season title.
    pub title: String,
    /// URL slug for the season.
    pub slug_title: String,
    /// Season number. Multiple remote seasons may share one number
    /// (alternate cuts, dubs); disambiguation is positional.
    pub season_number: u32,
    /// Position of the season within the title, catalog-assigned.
    pub sequence_number: u32,
    /// Human-facing display number (may differ from `season_number`).
    #[serde(default)]
    pub display_number: String,
    /// Opaque catalog identifier string (e.g. "GY8VEQ95Y|S1").
    #[serde(default)]
    pub identifier: String,
}

/// An episode as listed under a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeListing {
    /// Remote episode id.
    pub id: String,
    /// Episode title.
    pub title: String,
    /// URL slug for the episode.
    pub slug_title: String,
    /// Episode synopsis.
    #[serde(default)]
    pub description: String,
    /// Ordinal as the catalog prints it ("1", "11.5", "SP").
    pub ordinal: String,
    /// Numeric episode number, when the ordinal is a plain integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    /// Position of the episode within the season, catalog-assigned.
    pub sequence_number: u32,
    /// Thumbnail renditions.
    #[serde(default)]
    pub thumbnails: Vec<ImageSource>,
    /// Remote id of the owning season. Populated by the by-id endpoint;
    /// season-scoped listings leave it empty.
    #[serde(default)]
    pub season_id: String,
}

/// Series-level display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    /// Series title.
    pub title: String,
    /// Series synopsis.
    #[serde(default)]
    pub description: String,
    /// URL slug for the series.
    pub slug_title: String,
    /// Producing studio.
    #[serde(default)]
    pub studio: String,
    /// Portrait poster renditions.
    #[serde(default)]
    pub poster_tall: Vec<ImageSource>,
    /// Landscape poster renditions.
    #[serde(default)]
    pub poster_wide: Vec<ImageSource>,
}

/// A resolved episode reference from a positional query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Remote episode id.
    pub id: String,
    /// URL slug for the episode.
    pub slug_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_found() {
        let hit = Lookup::Found(42u32);
        assert!(hit.is_found());
        assert_eq!(hit.found(), Some(42));
    }

    #[test]
    fn test_lookup_not_found() {
        let miss: Lookup<u32> = Lookup::NotFound;
        assert!(!miss.is_found());
        assert_eq!(miss.found(), None);
    }

    #[test]
    fn test_episode_listing_deserialization_defaults() {
        let json = r#"{
            "id": "EP1",
            "title": "Pilot",
            "slug_title": "pilot",
            "ordinal": "1",
            "sequence_number": 1
        }"#;
        let episode: EpisodeListing = serde_json::from_str(json).unwrap();
        assert_eq!(episode.id, "EP1");
        assert!(episode.description.is_empty());
        assert!(episode.episode_number.is_none());
        assert!(episode.thumbnails.is_empty());
        assert!(episode.season_id.is_empty());
    }

    #[test]
    fn test_season_listing_roundtrip() {
        let season = SeasonListing {
            id: "S1".to_string(),
            title: "Season One".to_string(),
            slug_title: "season-one".to_string(),
            season_number: 1,
            sequence_number: 1,
            display_number: "1".to_string(),
            identifier: "T1|S1".to_string(),
        };

        let json = serde_json::to_string(&season).unwrap();
        let parsed: SeasonListing = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, season);
    }
}
