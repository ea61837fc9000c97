//! Filename-derived name helpers.
//!
//! Library items are named after files and folders, which carry scanner
//! conventions the catalog knows nothing about: trailing `(1998)` year tags,
//! `[tvdbid-76885]` provider tags, and placeholder season folders like
//! "Season 2". These helpers strip the noise before anything is sent to the
//! catalog's search endpoints.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Trailing `(year)` tag, e.g. "Show (1998)".
static YEAR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d{4}\)\s*$").unwrap());

/// Trailing `[provider-id]` tag, e.g. "Show [tvdbid-76885]".
static PROVIDER_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[[^\[\]]*\]\s*$").unwrap());

/// A purely generic season folder name: "Season 2", "season 10".
static GENERIC_SEASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^season\s+\d+$").unwrap());

/// Trailing episode/season ordinal or extension on a base file name,
/// e.g. "My Show - S01E02.mkv" -> "My Show - S01E02" handled by the host;
/// here only a trailing extension is removed.
static FILE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[A-Za-z0-9]{2,4}$").unwrap());

/// Strip trailing `(year)` and `[provider-id]` tags from a display name.
///
/// Tags can stack ("Show (1998) [tvdbid-76885]") in either order, so the
/// strip loops until the name stops changing.
pub fn strip_name_tags(name: &str) -> String {
    let mut current = name.trim().to_string();
    loop {
        let stripped = PROVIDER_TAG.replace(&current, "");
        let stripped = YEAR_TAG.replace(&stripped, "");
        let next = stripped.trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Base name of a season folder: the folder name without a file extension,
/// trimmed. Used as the by-name season lookup key.
pub fn season_base_name(folder_name: &str) -> String {
    FILE_EXTENSION
        .replace(folder_name.trim(), "")
        .trim()
        .to_string()
}

/// True when a season folder name is purely generic ("Season 3") and carries
/// no descriptive title the catalog could match on.
pub fn is_generic_season_name(name: &str) -> bool {
    GENERIC_SEASON.is_match(name.trim())
}
