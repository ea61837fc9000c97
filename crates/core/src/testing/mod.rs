//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborator
//! traits, allowing resolver and scrape-engine tests to run without real
//! infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use rollarr_core::testing::{fixtures, MockCatalog, MockSession, RecordingHook};
//!
//! let catalog = MockCatalog::new();
//! let session = MockSession::new();
//!
//! // Configure mock responses
//! catalog.add_title(fixtures::title_hit("T1", "Cowboy Bebop")).await;
//! session.set_fail(false);
//!
//! // Wire into resolvers / ScrapeEngine...
//! ```

mod mock_catalog;
mod mock_session;
mod recording_hook;

pub use mock_catalog::{MockCatalog, RecordedQuery};
pub use mock_session::MockSession;
pub use recording_hook::RecordingHook;

/// Test fixtures and helper functions.
pub mod fixtures {
    use uuid::Uuid;

    use crate::catalog::{EpisodeListing, ImageSource, SeasonListing, SeriesInfo, TitleHit};
    use crate::library::{ItemKind, LibraryItem};

    /// A searchable title hit.
    pub fn title_hit(id: &str, name: &str) -> TitleHit {
        TitleHit {
            id: id.to_string(),
            slug_title: slugify(name),
            name: name.to_string(),
        }
    }

    /// A season listing with the given id, number and title.
    pub fn season_listing(id: &str, number: u32, title: &str) -> SeasonListing {
        SeasonListing {
            id: id.to_string(),
            title: title.to_string(),
            slug_title: slugify(title),
            season_number: number,
            sequence_number: number,
            display_number: number.to_string(),
            identifier: format!("{}|S{}", id, number),
        }
    }

    /// An episode listing at the given ordinal.
    pub fn episode_listing(id: &str, ordinal: &str) -> EpisodeListing {
        EpisodeListing {
            id: id.to_string(),
            title: format!("Episode {}", ordinal),
            slug_title: format!("episode-{}", ordinal),
            description: String::new(),
            ordinal: ordinal.to_string(),
            episode_number: ordinal.parse().ok(),
            sequence_number: ordinal.parse().unwrap_or(0),
            thumbnails: vec![ImageSource {
                url: format!("https://img.example.test/{}.jpg", id),
                width: 640,
                height: 360,
            }],
            season_id: String::new(),
        }
    }

    /// Series info with posters.
    pub fn series_info(title: &str) -> SeriesInfo {
        SeriesInfo {
            title: title.to_string(),
            description: format!("About {}.", title),
            slug_title: slugify(title),
            studio: "Example Studio".to_string(),
            poster_tall: vec![ImageSource {
                url: "https://img.example.test/tall.jpg".to_string(),
                width: 600,
                height: 900,
            }],
            poster_wide: vec![ImageSource {
                url: "https://img.example.test/wide.jpg".to_string(),
                width: 1920,
                height: 1080,
            }],
        }
    }

    /// A series library item with no provider ids.
    pub fn series_item(name: &str) -> LibraryItem {
        LibraryItem::new(ItemKind::Series, name)
    }

    /// A movie library item with no provider ids.
    pub fn movie_item(name: &str) -> LibraryItem {
        LibraryItem::new(ItemKind::Movie, name)
    }

    /// A season child of the given series.
    pub fn season_item(parent: Uuid, number: u32, name: &str) -> LibraryItem {
        let mut item = LibraryItem::new(ItemKind::Season, name);
        item.parent_id = Some(parent);
        item.index_number = Some(number);
        item
    }

    /// An episode child of the given season.
    pub fn episode_item(parent: Uuid, number: u32) -> LibraryItem {
        let mut item = LibraryItem::new(ItemKind::Episode, format!("Episode {}", number));
        item.parent_id = Some(parent);
        item.index_number = Some(number);
        item
    }

    fn slugify(name: &str) -> String {
        name.to_lowercase().replace(' ', "-")
    }
}
