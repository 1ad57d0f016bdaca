//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `FINSTD_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_DB_NAME, DEFAULT_MAX_CONCURRENCY, DEFAULT_SEARCH_LIMIT,
};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FINSTD_*` overrides on top of defaults.
/// Embedding settings live in [`EmbeddingConfig`](crate::embedding::EmbeddingConfig).
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8001`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Catalog database used when a request does not name one.
    pub db_name: String,

    /// Catalog collection used when a request does not name one.
    pub collection_name: String,

    /// Nearest neighbors returned per candidate. Default: `5`.
    pub search_limit: usize,

    /// Concurrent candidate resolutions per request. Default: `8`.
    pub max_concurrency: usize,

    /// Per-request deadline. `None` disables it.
    pub request_timeout: Option<Duration>,
}

/// Default Qdrant URL used when `FINSTD_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8001,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "FINSTD_PORT";
    const ENV_BIND_ADDR: &'static str = "FINSTD_BIND_ADDR";
    const ENV_QDRANT_URL: &'static str = "FINSTD_QDRANT_URL";
    const ENV_DB_NAME: &'static str = "FINSTD_DB_NAME";
    const ENV_COLLECTION: &'static str = "FINSTD_COLLECTION";
    const ENV_SEARCH_LIMIT: &'static str = "FINSTD_SEARCH_LIMIT";
    const ENV_MAX_CONCURRENCY: &'static str = "FINSTD_MAX_CONCURRENCY";
    const ENV_REQUEST_TIMEOUT_MS: &'static str = "FINSTD_REQUEST_TIMEOUT_MS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let qdrant_url = Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let db_name = Self::parse_string_from_env(Self::ENV_DB_NAME, defaults.db_name);
        let collection_name =
            Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection_name);
        let search_limit =
            Self::parse_positive_from_env(Self::ENV_SEARCH_LIMIT, defaults.search_limit)?;
        let max_concurrency =
            Self::parse_positive_from_env(Self::ENV_MAX_CONCURRENCY, defaults.max_concurrency)?;
        let request_timeout = Self::parse_timeout_from_env()?;

        Ok(Self {
            port,
            bind_addr,
            qdrant_url,
            db_name,
            collection_name,
            search_limit,
            max_concurrency,
            request_timeout,
        })
    }

    /// Validates basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_name.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_DB_NAME,
            });
        }
        if self.collection_name.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_COLLECTION,
            });
        }
        if !self.qdrant_url.starts_with("http://") && !self.qdrant_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl {
                value: self.qdrant_url.clone(),
            });
        }
        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_positive_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => {
                let parsed: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::NumberParseError {
                            name: var_name,
                            value: value.clone(),
                            source: e,
                        })?;
                if parsed == 0 {
                    return Err(ConfigError::ZeroValue { name: var_name });
                }
                Ok(parsed)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_timeout_from_env() -> Result<Option<Duration>, ConfigError> {
        match env::var(Self::ENV_REQUEST_TIMEOUT_MS) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => {
                let millis: u64 =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::NumberParseError {
                            name: Self::ENV_REQUEST_TIMEOUT_MS,
                            value: value.clone(),
                            source: e,
                        })?;
                Ok((millis > 0).then(|| Duration::from_millis(millis)))
            }
            Err(_) => Ok(None),
        }
    }
}
