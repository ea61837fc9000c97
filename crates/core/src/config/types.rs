use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// Remote catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// Catalog API base URL (e.g., "https://api.catalog.example")
    pub base_url: String,
    /// Locale used when an item carries no preference
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Maximum results requested from the search endpoint
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_search_limit() -> u32 {
    6
}

fn default_timeout_secs() -> u64 {
    30
}

/// Session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub method: SessionMethod,
    /// Token endpoint URL (required when method = "credentials")
    #[serde(default)]
    pub token_url: Option<String>,
    /// Account username (required when method = "credentials")
    #[serde(default)]
    pub username: Option<String>,
    /// Account password (required when method = "credentials")
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            method: SessionMethod::Anonymous,
            token_url: None,
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionMethod {
    Anonymous,
    Credentials,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("rollarr.db")
}

/// Scrape engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Concurrent per-season episode fetches within one scrape
    #[serde(default = "default_max_parallel_fetches")]
    pub max_parallel_fetches: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_parallel_fetches: default_max_parallel_fetches(),
        }
    }
}

fn default_max_parallel_fetches() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let toml = r#"
[catalog]
base_url = "https://api.catalog.example"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.default_locale, "en-US");
        assert_eq!(config.catalog.search_limit, 6);
        assert_eq!(config.session.method, SessionMethod::Anonymous);
        assert_eq!(config.database.path, PathBuf::from("rollarr.db"));
        assert_eq!(config.scraper.max_parallel_fetches, 4);
    }

    #[test]
    fn test_credentials_session_parsed() {
        let toml = r#"
[catalog]
base_url = "https://api.catalog.example"

[session]
method = "credentials"
token_url = "https://auth.catalog.example/token"
username = "user"
password = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.session.method, SessionMethod::Credentials);
        assert_eq!(config.session.username.as_deref(), Some("user"));
    }

    #[test]
    fn test_missing_catalog_section_fails() {
        let toml = r#"
[database]
path = "somewhere.db"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
