use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{types::Config, ConfigError, SessionMethod};

/// BCP-47-ish locale tag the catalog accepts: "en-US", "pt-BR".
static LOCALE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2}-[A-Z]{2}$").unwrap());

/// Validate configuration
/// Currently validates:
/// - Catalog base URL is present and http(s)
/// - Default locale is a well-formed tag
/// - Credential sessions carry token URL, username, and password
/// - Scraper fan-out is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Catalog validation
    if config.catalog.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.base_url cannot be empty".to_string(),
        ));
    }
    if !config.catalog.base_url.starts_with("http://")
        && !config.catalog.base_url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(
            "catalog.base_url must be an http(s) URL".to_string(),
        ));
    }
    if !LOCALE_TAG.is_match(&config.catalog.default_locale) {
        return Err(ConfigError::ValidationError(format!(
            "catalog.default_locale '{}' is not a valid locale tag",
            config.catalog.default_locale
        )));
    }

    // Session validation
    if config.session.method == SessionMethod::Credentials {
        if config.session.token_url.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::ValidationError(
                "session.token_url is required for credential sessions".to_string(),
            ));
        }
        if config.session.username.as_deref().unwrap_or("").is_empty()
            || config.session.password.as_deref().unwrap_or("").is_empty()
        {
            return Err(ConfigError::ValidationError(
                "session.username and session.password are required for credential sessions"
                    .to_string(),
            ));
        }
    }

    // Scraper validation
    if config.scraper.max_parallel_fetches == 0 {
        return Err(ConfigError::ValidationError(
            "scraper.max_parallel_fetches cannot be 0".to_string(),
        ));
    }

    Ok(())
}
