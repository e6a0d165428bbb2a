//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Client identity ---
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Redirect URI registered with the Strava application
    pub redirect_uri: String,

    // --- Endpoints ---
    /// Base URL of the REST API (no trailing slash)
    pub api_base_url: String,
    /// Base URL of the OAuth endpoints (`/authorize`, `/token`)
    pub oauth_base_url: String,

    // --- Local behavior ---
    /// File holding persisted credentials
    pub credentials_path: PathBuf,
    /// Request timeout; `None` leaves the transport default in place
    pub http_timeout_secs: Option<u64>,
    /// Treat tokens as expired this many seconds early
    pub refresh_margin_secs: i64,
    /// Upper bound on pages read by one aggregation; `None` is unbounded
    pub aggregate_max_pages: Option<u32>,
}

pub const DEFAULT_API_BASE_URL: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://www.strava.com/oauth";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8081/callback";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            redirect_uri: env::var("STRAVA_REDIRECT_URI")
                .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string()),

            api_base_url: trim_base(
                env::var("STRAVA_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            ),
            oauth_base_url: trim_base(
                env::var("STRAVA_OAUTH_BASE")
                    .unwrap_or_else(|_| DEFAULT_OAUTH_BASE_URL.to_string()),
            ),

            credentials_path: match env::var("TRAILBOOK_CREDENTIALS_PATH") {
                Ok(path) => PathBuf::from(path),
                Err(_) => default_credentials_path()?,
            },
            http_timeout_secs: parse_optional("TRAILBOOK_HTTP_TIMEOUT_SECS")?,
            refresh_margin_secs: parse_refresh_margin()?,
            aggregate_max_pages: parse_optional("TRAILBOOK_MAX_PAGES")?,
        })
    }

    /// Config for tests, pointing every endpoint at `base_url`.
    pub fn test_default(base_url: &str) -> Self {
        let base_url = trim_base(base_url.to_string());
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            redirect_uri: "trailbook://callback".to_string(),
            api_base_url: format!("{}/api/v3", base_url),
            oauth_base_url: format!("{}/oauth", base_url),
            credentials_path: env::temp_dir().join("trailbook-test-credentials.json"),
            http_timeout_secs: None,
            refresh_margin_secs: 0,
            aggregate_max_pages: None,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.oauth_base_url)
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.oauth_base_url)
    }

    pub fn activities_url(&self) -> String {
        format!("{}/athlete/activities", self.api_base_url)
    }
}

fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_credentials_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("trailbook").join("credentials.json"))
        .ok_or(ConfigError::Missing("TRAILBOOK_CREDENTIALS_PATH"))
}

fn parse_optional<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        _ => Ok(None),
    }
}

/// A negative margin would make expired tokens look fresh.
fn parse_refresh_margin() -> Result<i64, ConfigError> {
    const NAME: &str = "TRAILBOOK_REFRESH_MARGIN_SECS";
    match parse_optional::<i64>(NAME)? {
        Some(margin) if margin < 0 => Err(ConfigError::Invalid {
            name: NAME,
            value: margin.to_string(),
        }),
        margin => Ok(margin.unwrap_or(0)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
