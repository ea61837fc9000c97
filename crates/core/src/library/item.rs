//! Library item model and the provider-id bag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::names;

/// Provider-id bag keys. The bag itself is stringly typed because the host
/// catalog stores arbitrary provider ids; all reads and writes go through the
/// typed accessors on `ProviderIds` so the key strings live in one place.
const KEY_SERIES_ID: &str = "SeriesId";
const KEY_SERIES_SLUG: &str = "SeriesSlugTitle";
const KEY_SEASON_ID: &str = "SeasonId";
const KEY_EPISODE_ID: &str = "EpisodeId";
const KEY_EPISODE_SLUG: &str = "EpisodeSlugTitle";

/// What kind of library item this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Series,
    Season,
    Episode,
    Movie,
}

/// Typed view over the host catalog's provider-id string bag.
///
/// Each accessor distinguishes three states: `None` means the id was never
/// looked up; `Some("")` is the empty sentinel written after a definitive
/// not-found; any other value is a resolved remote id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderIds(HashMap<String, String>);

impl ProviderIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn series_id(&self) -> Option<&str> {
        self.get(KEY_SERIES_ID)
    }

    pub fn set_series_id(&mut self, id: impl Into<String>) {
        self.set(KEY_SERIES_ID, id);
    }

    pub fn series_slug(&self) -> Option<&str> {
        self.get(KEY_SERIES_SLUG)
    }

    pub fn set_series_slug(&mut self, slug: impl Into<String>) {
        self.set(KEY_SERIES_SLUG, slug);
    }

    pub fn season_id(&self) -> Option<&str> {
        self.get(KEY_SEASON_ID)
    }

    pub fn set_season_id(&mut self, id: impl Into<String>) {
        self.set(KEY_SEASON_ID, id);
    }

    pub fn episode_id(&self) -> Option<&str> {
        self.get(KEY_EPISODE_ID)
    }

    pub fn set_episode_id(&mut self, id: impl Into<String>) {
        self.set(KEY_EPISODE_ID, id);
    }

    pub fn episode_slug(&self) -> Option<&str> {
        self.get(KEY_EPISODE_SLUG)
    }

    pub fn set_episode_slug(&mut self, slug: impl Into<String>) {
        self.set(KEY_EPISODE_SLUG, slug);
    }

    /// Raw view for host-catalog adapters that persist the whole bag.
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.0
    }
}

impl From<HashMap<String, String>> for ProviderIds {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// A series, season, episode or movie as the host catalog presents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Host catalog id.
    pub id: Uuid,
    /// What the item is.
    pub kind: ItemKind,
    /// Display name, usually derived from the file or folder name.
    pub name: String,
    /// Ordinal within the parent (season number, episode number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_number: Option<u32>,
    /// Parent item, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// Preferred metadata locale, falling back to the library default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Remote provider ids resolved so far.
    #[serde(default)]
    pub provider_ids: ProviderIds,
}

impl LibraryItem {
    /// Create an item with no ordinal, parent, or provider ids.
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            index_number: None,
            parent_id: None,
            locale: None,
            provider_ids: ProviderIds::new(),
        }
    }

    /// Display name with trailing `(year)` and `[providerid-...]` tags
    /// stripped, i.e. the search string for title resolution.
    pub fn base_name(&self) -> String {
        names::strip_name_tags(&self.name)
    }

    /// Preferred locale, or the given default.
    pub fn locale_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.locale.as_deref().unwrap_or(default)
    }
}
