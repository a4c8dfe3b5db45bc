//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::time::Duration;
use url::Url;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub graphql: GraphqlConfig,
    pub identity: IdentityConfig,
    pub timing: TimingConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// GraphQL endpoints
#[derive(Debug, Clone)]
pub struct GraphqlConfig {
    /// Queries and mutations
    pub http_url: Url,
    /// Subscriptions (graphql-transport-ws)
    pub ws_url: Url,
    pub timeout_secs: u64,
}

impl GraphqlConfig {
    /// Build from an HTTP endpoint, deriving the WebSocket endpoint from it
    pub fn from_http_url(http_url: Url) -> Result<Self, ConfigError> {
        let ws_url = derive_ws_url(&http_url)?;
        Ok(Self {
            http_url,
            ws_url,
            timeout_secs: default_timeout_secs(),
        })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Third-party identity provider
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub url: Url,
    /// Public API key sent with every identity request
    pub api_key: String,
    /// Base URL the provider redirects back to after OAuth and email flows
    pub redirect_base_url: Url,
}

impl IdentityConfig {
    /// Absolute redirect URL for an in-app path
    pub fn redirect_to(&self, path: &str) -> Result<Url, ConfigError> {
        self.redirect_base_url
            .join(path)
            .map_err(|e| ConfigError::InvalidValue("APP_REDIRECT_BASE_URL", e.to_string()))
    }
}

/// UI timers
#[derive(Debug, Clone)]
pub struct TimingConfig {
    pub typing_idle_ms: u64,
    pub search_debounce_ms: u64,
    pub invite_code_debounce_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            typing_idle_ms: default_typing_idle_ms(),
            search_debounce_ms: default_search_debounce_ms(),
            invite_code_debounce_ms: default_invite_code_debounce_ms(),
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn typing_idle(&self) -> Duration {
        Duration::from_millis(self.typing_idle_ms)
    }

    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    #[must_use]
    pub fn invite_code_debounce(&self) -> Duration {
        Duration::from_millis(self.invite_code_debounce_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "pairing".to_string()
}

fn default_redirect_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_typing_idle_ms() -> u64 {
    2000
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_invite_code_debounce_ms() -> u64 {
    500
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidValue(var, e.to_string()))
}

fn derive_ws_url(http_url: &Url) -> Result<Url, ConfigError> {
    let mut ws_url = http_url.clone();
    let scheme = match http_url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(ConfigError::InvalidValue(
                "GRAPHQL_HTTP_URL",
                format!("unsupported scheme {other}"),
            ))
        }
    };
    ws_url
        .set_scheme(scheme)
        .map_err(|()| ConfigError::InvalidValue("GRAPHQL_WS_URL", http_url.to_string()))?;
    Ok(ws_url)
}

fn env_number<T: std::str::FromStr>(var: &str, default: fn() -> T) -> T {
    env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(default)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let http_url = env::var("GRAPHQL_HTTP_URL")
            .map_err(|_| ConfigError::MissingVar("GRAPHQL_HTTP_URL"))
            .and_then(|s| parse_url("GRAPHQL_HTTP_URL", &s))?;
        let ws_url = match env::var("GRAPHQL_WS_URL") {
            Ok(s) => parse_url("GRAPHQL_WS_URL", &s)?,
            Err(_) => derive_ws_url(&http_url)?,
        };

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            graphql: GraphqlConfig {
                http_url,
                ws_url,
                timeout_secs: env_number("HTTP_TIMEOUT_SECS", default_timeout_secs),
            },
            identity: IdentityConfig {
                url: env::var("IDENTITY_URL")
                    .map_err(|_| ConfigError::MissingVar("IDENTITY_URL"))
                    .and_then(|s| parse_url("IDENTITY_URL", &s))?,
                api_key: env::var("IDENTITY_API_KEY")
                    .map_err(|_| ConfigError::MissingVar("IDENTITY_API_KEY"))?,
                redirect_base_url: parse_url(
                    "APP_REDIRECT_BASE_URL",
                    &env::var("APP_REDIRECT_BASE_URL")
                        .unwrap_or_else(|_| default_redirect_base_url()),
                )?,
            },
            timing: TimingConfig {
                typing_idle_ms: env_number("TYPING_IDLE_MS", default_typing_idle_ms),
                search_debounce_ms: env_number("SEARCH_DEBOUNCE_MS", default_search_debounce_ms),
                invite_code_debounce_ms: env_number(
                    "INVITE_CODE_DEBOUNCE_MS",
                    default_invite_code_debounce_ms,
                ),
            },
        })
    }

    /// Build a configuration for explicit endpoints (tests, embedding)
    pub fn for_endpoints(
        graphql_http_url: &str,
        identity_url: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            graphql: GraphqlConfig::from_http_url(parse_url("GRAPHQL_HTTP_URL", graphql_http_url)?)?,
            identity: IdentityConfig {
                url: parse_url("IDENTITY_URL", identity_url)?,
                api_key: api_key.into(),
                redirect_base_url: parse_url(
                    "APP_REDIRECT_BASE_URL",
                    &default_redirect_base_url(),
                )?,
            },
            timing: TimingConfig::default(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
