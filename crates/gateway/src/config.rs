//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Base URL of the managed backend deployment
//!
//! ## Optional
//! - `GATEWAY_HOST` - Bind address (default: 127.0.0.1)
//! - `GATEWAY_PORT` - Listen port (default: 3000)
//! - `GATEWAY_SITE_DIR` - Directory holding the built app shell (default: site)
//! - `GATEWAY_ALLOWED_ORIGINS` - Comma-separated CORS allow-list
//! - `GATEWAY_PUBLIC_PREFIXES` - Comma-separated public path prefixes
//! - `GATEWAY_PROTECTED_PREFIXES` - Comma-separated protected path prefixes
//! - `SESSION_COOKIE_NAME` - Session presence cookie (default: __session)
//! - `SIGN_IN_PATH` - Where anonymous visitors are sent (default: /sign-in)
//! - `REDIRECT_PARAM` - Return-path query parameter (default: redirect)
//! - `BACKEND_DEPLOY_KEY` - Deployment key for privileged calls
//! - `BACKEND_CACHE_TTL_SECS` - Public query cache lifetime (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use marketplace_core::routes::{
    DEFAULT_PROTECTED_PREFIXES, DEFAULT_PUBLIC_PREFIXES, DEFAULT_REDIRECT_PARAM,
    DEFAULT_SIGN_IN_PATH,
};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SESSION_COOKIE: &str = "__session";
const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "replace", "placeholder", "xxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Gateway application configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory served behind the proxy
    pub site_dir: PathBuf,
    /// Managed backend connection
    pub backend: BackendConfig,
    /// Route classification and CORS settings
    pub proxy: ProxySettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Managed backend connection settings.
///
/// Implements `Debug` manually to redact the deployment key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Deployment base URL
    pub url: Url,
    /// Deployment key for privileged (non-user) calls
    pub deploy_key: Option<SecretString>,
    /// How long anonymous query results are cached
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field(
                "deploy_key",
                &self.deploy_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl BackendConfig {
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self {
            url,
            deploy_key: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// Settings for the page proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub allowed_origins: Vec<String>,
    pub public_prefixes: Vec<String>,
    pub protected_prefixes: Vec<String>,
    pub session_cookie: String,
    pub sign_in_path: String,
    pub redirect_param: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            public_prefixes: to_strings(DEFAULT_PUBLIC_PREFIXES),
            protected_prefixes: to_strings(DEFAULT_PROTECTED_PREFIXES),
            session_cookie: DEFAULT_SESSION_COOKIE.to_owned(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_owned(),
            redirect_param: DEFAULT_REDIRECT_PARAM.to_owned(),
        }
    }
}

impl ProxySettings {
    /// Load the proxy settings alone, without requiring `BACKEND_URL`.
    ///
    /// Calls `dotenvy::dotenv()` like [`GatewayConfig::from_env`].
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(get_optional_env)
    }

    /// Build settings from `lookup`, which returns a variable's value or
    /// `None` when it is unset. Unset or blank variables keep their default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let list = |key: &str| value(key).map(|raw| parse_list(&raw));

        Self {
            allowed_origins: list("GATEWAY_ALLOWED_ORIGINS").unwrap_or_default(),
            public_prefixes: list("GATEWAY_PUBLIC_PREFIXES").unwrap_or(defaults.public_prefixes),
            protected_prefixes: list("GATEWAY_PROTECTED_PREFIXES")
                .unwrap_or(defaults.protected_prefixes),
            session_cookie: value("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie),
            sign_in_path: value("SIGN_IN_PATH").unwrap_or(defaults.sign_in_path),
            redirect_param: value("REDIRECT_PARAM").unwrap_or(defaults.redirect_param),
        }
    }
}

impl GatewayConfig {
    /// Configuration with defaults for everything but the backend URL.
    #[must_use]
    pub fn new(backend_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            site_dir: PathBuf::from("site"),
            backend: BackendConfig::new(backend_url),
            proxy: ProxySettings::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the deployment key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("GATEWAY_HOST", "127.0.0.1")?;
        let port = parse_env("GATEWAY_PORT", "3000")?;
        let site_dir = PathBuf::from(get_env_or_default("GATEWAY_SITE_DIR", "site"));

        let url = get_required_env("BACKEND_URL")?;
        let url = Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_owned(), e.to_string()))?;
        let deploy_key = get_optional_env("BACKEND_DEPLOY_KEY")
            .map(|key| validate_secret(&key, "BACKEND_DEPLOY_KEY").map(|()| SecretString::from(key)))
            .transpose()?;
        let cache_ttl = Duration::from_secs(parse_env(
            "BACKEND_CACHE_TTL_SECS",
            &DEFAULT_CACHE_TTL_SECS.to_string(),
        )?);

        let proxy = ProxySettings::from_env();

        Ok(Self {
            host,
            port,
            site_dir,
            backend: BackendConfig {
                url,
                deploy_key,
                cache_ttl,
            },
            proxy,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|&v| v.to_owned()).collect()
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable; empty counts as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_owned())
}

/// Parse an environment variable, falling back to `default`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Reject secrets that are obviously placeholders.
fn validate_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }
    Ok(())
}
