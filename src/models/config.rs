//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

use crate::error::{AppError, Result};

/// Placeholder substituted with the council name.
pub const COUNCIL_PLACEHOLDER: &str = "{council}";

/// Placeholder substituted with the suburb name.
pub const SUBURB_PLACEHOLDER: &str = "{suburb}";

/// Root application configuration.
///
/// Built once at startup and handed to each component by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Upstream endpoint URLs and templates
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Raw response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// SQLite store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }

        let endpoints = &self.endpoints;
        check_url("endpoints.demand_url", &endpoints.demand_url)?;
        check_url("endpoints.summary_url", &endpoints.summary_url)?;
        check_url("endpoints.councils_url", &endpoints.councils_url)?;
        check_template(
            "endpoints.council_suburbs_url",
            &endpoints.council_suburbs_url,
            COUNCIL_PLACEHOLDER,
        )?;
        check_template(
            "endpoints.suburb_events_url",
            &endpoints.suburb_events_url,
            SUBURB_PLACEHOLDER,
        )?;

        if self.cache.enabled && self.cache.dir.as_os_str().is_empty() {
            return Err(AppError::validation(
                "cache.dir must be set when caching is enabled",
            ));
        }
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(AppError::validation("storage.database_path is empty"));
        }
        Ok(())
    }

    /// Suburb listing URL for one council.
    pub fn council_suburbs_url(&self, council: &str) -> String {
        expand(&self.endpoints.council_suburbs_url, COUNCIL_PLACEHOLDER, council)
    }

    /// Outage event listing URL for one suburb.
    pub fn suburb_events_url(&self, suburb: &str) -> String {
        expand(&self.endpoints.suburb_events_url, SUBURB_PLACEHOLDER, suburb)
    }
}

fn expand(template: &str, placeholder: &str, value: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
    template.replace(placeholder, &encoded)
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| AppError::validation(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::validation(format!(
            "{field} must use http or https, got '{other}'"
        ))),
    }
}

fn check_template(field: &str, value: &str, placeholder: &str) -> Result<()> {
    if !value.contains(placeholder) {
        return Err(AppError::validation(format!(
            "{field} must contain {placeholder}"
        )));
    }
    check_url(field, &value.replace(placeholder, "x"))
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Upstream endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Plain-text network demand value
    #[serde(default = "defaults::demand_url")]
    pub demand_url: String,

    /// Outage summary JSON
    #[serde(default = "defaults::summary_url")]
    pub summary_url: String,

    /// Council list JSON
    #[serde(default = "defaults::councils_url")]
    pub councils_url: String,

    /// Suburbs of a council, templated by `{council}`
    #[serde(default = "defaults::council_suburbs_url")]
    pub council_suburbs_url: String,

    /// Outage events of a suburb, templated by `{suburb}`
    #[serde(default = "defaults::suburb_events_url")]
    pub suburb_events_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            demand_url: defaults::demand_url(),
            summary_url: defaults::summary_url(),
            councils_url: defaults::councils_url(),
            council_suburbs_url: defaults::council_suburbs_url(),
            suburb_events_url: defaults::suburb_events_url(),
        }
    }
}

/// Raw response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Read and populate the cache on every fetch
    #[serde(default)]
    pub enabled: bool,

    /// Directory holding one file per cached URL
    #[serde(default = "defaults::cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: defaults::cache_dir(),
        }
    }
}

/// SQLite store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: defaults::database_path(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; outage-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Endpoint defaults
    pub fn demand_url() -> String {
        "https://www.energex.com.au/static/Energex/Network%20Demand/networkdemand.txt".into()
    }
    pub fn summary_url() -> String {
        "https://www.energex.com.au/api/outages/v0.3/summary".into()
    }
    pub fn councils_url() -> String {
        "https://www.energex.com.au/api/outages/v0.3/council?council=".into()
    }
    pub fn council_suburbs_url() -> String {
        "https://www.energex.com.au/api/outages/v0.3/suburb?council={council}&suburb=".into()
    }
    pub fn suburb_events_url() -> String {
        "https://www.energex.com.au/api/outages/v0.3/search?suburb={suburb}".into()
    }

    // Cache and storage defaults
    pub fn cache_dir() -> PathBuf {
        PathBuf::from("cache")
    }
    pub fn database_path() -> PathBuf {
        PathBuf::from("data.sqlite")
    }
}
