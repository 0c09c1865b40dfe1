use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::articles::VisibilityMargins;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as URL: {source}")]
    ParseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,
    /// JSON seed document imported on startup.
    pub seed_path: Option<PathBuf>,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
    /// Figures per browse page.
    pub page_size: u32,

    // Remote content API
    /// When set, articles and legacy summaries are resolved from this API
    /// instead of the local store.
    pub content_api_url: Option<Url>,
    pub http_timeout: Duration,

    // Lazy loading
    pub near_margin_px: u32,
    pub preload_margin_px: u32,
    /// Height of the first render window; events inside it get their sources inline.
    pub initial_viewport_px: u32,
    /// Estimated rendered height of one event card.
    pub event_height_px: u32,
}

impl Default for Config {
    fn default() -> Self {
        let margins = VisibilityMargins::default();
        Self {
            database_path: PathBuf::from("./data/ehco.sqlite"),
            seed_path: None,
            web_host: "0.0.0.0".to_string(),
            web_port: 8080,
            page_size: 18,
            content_api_url: None,
            http_timeout: Duration::from_secs(10),
            near_margin_px: margins.near_px,
            preload_margin_px: margins.preload_px,
            initial_viewport_px: 1200,
            event_height_px: 240,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            // Database
            database_path: optional_env("DATABASE_PATH")
                .map_or(defaults.database_path, PathBuf::from),
            seed_path: optional_env("SEED_PATH").map(PathBuf::from),

            // Web Server
            web_host: env_or_default("WEB_HOST", &defaults.web_host),
            web_port: parse_env("WEB_PORT", defaults.web_port)?,
            page_size: parse_env("PAGE_SIZE", defaults.page_size)?,

            // Remote content API
            content_api_url: parse_env_url("CONTENT_API_URL")?,
            http_timeout: Duration::from_secs(parse_env(
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )?),

            // Lazy loading
            near_margin_px: parse_env("NEAR_MARGIN_PX", defaults.near_margin_px)?,
            preload_margin_px: parse_env("PRELOAD_MARGIN_PX", defaults.preload_margin_px)?,
            initial_viewport_px: parse_env("INITIAL_VIEWPORT_PX", defaults.initial_viewport_px)?,
            event_height_px: parse_env("EVENT_HEIGHT_PX", defaults.event_height_px)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(invalid("PAGE_SIZE", "must be at least 1"));
        }
        if self.event_height_px == 0 {
            return Err(invalid("EVENT_HEIGHT_PX", "must be at least 1"));
        }
        if self.http_timeout.is_zero() {
            return Err(invalid("HTTP_TIMEOUT_SECS", "must be at least 1"));
        }
        if self.preload_margin_px < self.near_margin_px {
            return Err(invalid(
                "PRELOAD_MARGIN_PX",
                "must not be smaller than NEAR_MARGIN_PX",
            ));
        }
        if let Some(url) = &self.content_api_url {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid("CONTENT_API_URL", "must be an http(s) URL"));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn visibility_margins(&self) -> VisibilityMargins {
        VisibilityMargins {
            near_px: self.near_margin_px,
            preload_px: self.preload_margin_px,
        }
    }

    /// Number of events rendered with their sources resolved up front.
    #[must_use]
    pub fn initial_event_count(&self) -> usize {
        let count = self.initial_viewport_px.div_ceil(self.event_height_px.max(1));
        usize::try_from(count).unwrap_or(usize::MAX)
    }
}

fn invalid(name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    optional_env(name).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    optional_env(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        })
    })
}

fn parse_env_url(name: &str) -> Result<Option<Url>, ConfigError> {
    optional_env(name)
        .map(|val| {
            Url::parse(&val).map_err(|e| ConfigError::ParseUrl {
                name: name.to_string(),
                source: e,
            })
        })
        .transpose()
}
