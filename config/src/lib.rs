//! # Configuration Management for NosqlHaus
//!
//! This crate provides the configuration structures consumed by the handle
//! factory, the prepared-query cache and the repositories.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{AuthConfig, Consistency, HandleConfig, NosqlConfig};
//!
//! let config = NosqlConfig::new(
//!     HandleConfig::new("http://localhost:8080", AuthConfig::Simulated),
//! )
//! .with_default_consistency(Consistency::Absolute);
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! timestamp_precision = 3
//! default_consistency = "EVENTUAL"
//! default_durability = "COMMIT_NO_SYNC"
//!
//! [handle]
//! endpoint = "http://localhost:8080"
//! user_agent = "inventory-service/2.1"
//! request_timeout_ms = 5000
//!
//! [handle.auth]
//! kind = "simulated"
//!
//! [table]
//! capacity_mode = "provisioned"
//! storage_gb = 25
//! read_units = 50
//! write_units = 50
//! table_request_timeout_ms = 60000
//! table_request_poll_interval_ms = 500
//!
//! [query_cache]
//! capacity = 1000
//! lifetime_ms = 600000
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::NosqlConfig;
//!
//! // Load from NOSQLHAUS_CONFIG or ./nosqlhaus.toml
//! let config = NosqlConfig::load()?;
//!
//! // Or load from custom path
//! let config = NosqlConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

pub mod options;

pub use options::{CapacityMode, Consistency, Durability};

use serde::{Deserialize, Serialize};
use std::{env, path::Path, time::Duration};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./nosqlhaus.toml";
const CONFIG_PATH_ENV: &str = "NOSQLHAUS_CONFIG";

pub const DEFAULT_QUERY_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_QUERY_CACHE_LIFETIME_MS: u64 = 10 * 60 * 1000;
pub const DEFAULT_TABLE_REQUEST_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_TABLE_REQUEST_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_TIMESTAMP_PRECISION: u8 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_STORAGE_GB: u32 = 25;
pub const DEFAULT_READ_UNITS: u32 = 50;
pub const DEFAULT_WRITE_UNITS: u32 = 50;

/// Highest fractional-second precision supported for timestamp fields
pub const MAX_TIMESTAMP_PRECISION: u8 = 9;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete NosqlHaus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NosqlConfig {
    /// Connection settings handed to the driver; required
    pub handle: Option<HandleConfig>,
    #[serde(default = "default_timestamp_precision")]
    pub timestamp_precision: u8,
    #[serde(default)]
    pub default_consistency: Consistency,
    #[serde(default)]
    pub default_durability: Durability,
    #[serde(default)]
    pub table: TableDefaults,
    #[serde(default)]
    pub query_cache: QueryCacheConfig,
}

/// Settings for the single client handle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleConfig {
    /// Service endpoint, e.g. `http://localhost:8080` for a local simulator
    pub endpoint: Option<String>,
    pub auth: Option<AuthConfig>,
    /// Caller-supplied user agent; the library identifier is added on connect
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Authorization provider selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Fixed bearer token for local simulators, no real authentication
    Simulated,
    /// Pre-issued bearer token
    BearerToken { token: String },
}

/// Table creation defaults, passed through to DDL collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefaults {
    #[serde(default)]
    pub capacity_mode: CapacityMode,
    #[serde(default = "default_storage_gb")]
    pub storage_gb: u32,
    #[serde(default = "default_read_units")]
    pub read_units: u32,
    #[serde(default = "default_write_units")]
    pub write_units: u32,
    #[serde(default = "default_table_request_timeout_ms")]
    pub table_request_timeout_ms: u64,
    #[serde(default = "default_table_request_poll_interval_ms")]
    pub table_request_poll_interval_ms: u64,
}

/// Prepared-query cache sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCacheConfig {
    #[serde(default = "default_query_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_query_cache_lifetime_ms")]
    pub lifetime_ms: u64,
}

fn default_timestamp_precision() -> u8 {
    DEFAULT_TIMESTAMP_PRECISION
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_storage_gb() -> u32 {
    DEFAULT_STORAGE_GB
}

fn default_read_units() -> u32 {
    DEFAULT_READ_UNITS
}

fn default_write_units() -> u32 {
    DEFAULT_WRITE_UNITS
}

fn default_table_request_timeout_ms() -> u64 {
    DEFAULT_TABLE_REQUEST_TIMEOUT_MS
}

fn default_table_request_poll_interval_ms() -> u64 {
    DEFAULT_TABLE_REQUEST_POLL_INTERVAL_MS
}

fn default_query_cache_capacity() -> usize {
    DEFAULT_QUERY_CACHE_CAPACITY
}

fn default_query_cache_lifetime_ms() -> u64 {
    DEFAULT_QUERY_CACHE_LIFETIME_MS
}

impl NosqlConfig {
    /// Create a configuration with default table, cache and option settings
    pub fn new(handle: HandleConfig) -> Self {
        Self {
            handle: Some(handle),
            timestamp_precision: DEFAULT_TIMESTAMP_PRECISION,
            default_consistency: Consistency::default(),
            default_durability: Durability::default(),
            table: TableDefaults::default(),
            query_cache: QueryCacheConfig::default(),
        }
    }

    pub fn with_default_consistency(mut self, consistency: Consistency) -> Self {
        self.default_consistency = consistency;
        self
    }

    pub fn with_default_durability(mut self, durability: Durability) -> Self {
        self.default_durability = durability;
        self
    }

    pub fn with_timestamp_precision(mut self, precision: u8) -> Self {
        self.timestamp_precision = precision;
        self
    }

    pub fn with_table_defaults(mut self, table: TableDefaults) -> Self {
        self.table = table;
        self
    }

    pub fn with_query_cache(mut self, query_cache: QueryCacheConfig) -> Self {
        self.query_cache = query_cache;
        self
    }

    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the default path is tried next
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Handle settings, failing when they were never provided
    pub fn handle_config(&self) -> Result<&HandleConfig, ConfigError> {
        self.handle
            .as_ref()
            .ok_or_else(|| ConfigError::Invalid("Handle configuration is required".to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let handle = self.handle_config()?;
        handle.validate()?;

        if self.timestamp_precision > MAX_TIMESTAMP_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "Timestamp precision must be between 0 and {}, got {}",
                MAX_TIMESTAMP_PRECISION, self.timestamp_precision
            )));
        }

        self.table.validate()?;
        self.query_cache.validate()?;

        Ok(())
    }
}

impl HandleConfig {
    /// Create handle settings for an endpoint and auth provider
    pub fn new(endpoint: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            auth: Some(auth),
            user_agent: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.endpoint.as_deref() {
            None => {
                return Err(ConfigError::Invalid(
                    "Service endpoint is required".to_string(),
                ));
            }
            Some(endpoint) if endpoint.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "Service endpoint cannot be empty".to_string(),
                ));
            }
            Some(_) => {}
        }

        match &self.auth {
            None => {
                return Err(ConfigError::Invalid(
                    "Authorization provider is required".to_string(),
                ));
            }
            Some(AuthConfig::BearerToken { token }) if token.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "Bearer token cannot be empty".to_string(),
                ));
            }
            Some(_) => {}
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "Handle request_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl TableDefaults {
    pub fn table_request_timeout(&self) -> Duration {
        Duration::from_millis(self.table_request_timeout_ms)
    }

    pub fn table_request_poll_interval(&self) -> Duration {
        Duration::from_millis(self.table_request_poll_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_gb == 0 {
            return Err(ConfigError::Invalid(
                "Table storage_gb must be greater than 0".to_string(),
            ));
        }
        if self.capacity_mode == CapacityMode::Provisioned
            && (self.read_units == 0 || self.write_units == 0)
        {
            return Err(ConfigError::Invalid(
                "Provisioned tables need read_units and write_units greater than 0".to_string(),
            ));
        }
        if self.table_request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "Table table_request_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.table_request_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "Table table_request_poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.table_request_poll_interval_ms > self.table_request_timeout_ms {
            return Err(ConfigError::Invalid(
                "Table poll interval cannot be greater than the table request timeout"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TableDefaults {
    fn default() -> Self {
        Self {
            capacity_mode: CapacityMode::default(),
            storage_gb: DEFAULT_STORAGE_GB,
            read_units: DEFAULT_READ_UNITS,
            write_units: DEFAULT_WRITE_UNITS,
            table_request_timeout_ms: DEFAULT_TABLE_REQUEST_TIMEOUT_MS,
            table_request_poll_interval_ms: DEFAULT_TABLE_REQUEST_POLL_INTERVAL_MS,
        }
    }
}

impl QueryCacheConfig {
    pub fn new(capacity: usize, lifetime_ms: u64) -> Self {
        Self {
            capacity,
            lifetime_ms,
        }
    }

    /// Get lifetime as Duration
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid(
                "Query cache capacity must be greater than 0".to_string(),
            ));
        }
        if self.lifetime_ms == 0 {
            return Err(ConfigError::Invalid(
                "Query cache lifetime_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUERY_CACHE_CAPACITY,
            lifetime_ms: DEFAULT_QUERY_CACHE_LIFETIME_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn simulated() -> NosqlConfig {
        NosqlConfig::new(HandleConfig::new("http://localhost:8080", AuthConfig::Simulated))
    }

    #[test]
    fn test_documented_defaults() {
        let config = simulated();

        assert_eq!(config.query_cache.capacity, 1000);
        assert_eq!(config.query_cache.lifetime(), Duration::from_secs(600));
        assert_eq!(config.table.table_request_timeout_ms, 60_000);
        assert_eq!(config.table.table_request_poll_interval_ms, 500);
        assert_eq!(config.timestamp_precision, 3);
        assert_eq!(config.default_consistency, Consistency::Eventual);
        assert_eq!(config.default_durability, Durability::CommitNoSync);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_handle_is_rejected() {
        let mut config = simulated();
        config.handle = None;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let mut config = simulated();
        if let Some(handle) = config.handle.as_mut() {
            handle.endpoint = None;
        }
        assert!(config.validate().is_err());

        let config = NosqlConfig::new(HandleConfig::new("   ", AuthConfig::Simulated));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_auth_is_rejected() {
        let mut config = simulated();
        if let Some(handle) = config.handle.as_mut() {
            handle.auth = None;
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Authorization provider"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(simulated().with_timestamp_precision(10).validate().is_err());
        assert!(simulated()
            .with_query_cache(QueryCacheConfig::new(0, 1000))
            .validate()
            .is_err());
        assert!(simulated()
            .with_query_cache(QueryCacheConfig::new(10, 0))
            .validate()
            .is_err());

        let table = TableDefaults {
            table_request_poll_interval_ms: 70_000,
            ..TableDefaults::default()
        };
        assert!(simulated().with_table_defaults(table).validate().is_err());

        let on_demand = TableDefaults {
            capacity_mode: CapacityMode::OnDemand,
            read_units: 0,
            write_units: 0,
            ..TableDefaults::default()
        };
        assert!(simulated().with_table_defaults(on_demand).validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = NosqlConfig::from_toml_str(
            r#"
            default_consistency = "ABSOLUTE"

            [handle]
            endpoint = "http://localhost:8080"

            [handle.auth]
            kind = "bearer_token"
            token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_consistency, Consistency::Absolute);
        assert_eq!(config.default_durability, Durability::CommitNoSync);
        assert_eq!(config.query_cache.capacity, DEFAULT_QUERY_CACHE_CAPACITY);

        let handle = config.handle_config().unwrap();
        assert_eq!(handle.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(
            handle.auth,
            Some(AuthConfig::BearerToken {
                token: "secret".to_string()
            })
        );
    }

    #[test]
    fn test_toml_without_auth_fails() {
        let result = NosqlConfig::from_toml_str(
            r#"
            [handle]
            endpoint = "http://localhost:8080"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            timestamp_precision = 6
            default_durability = "COMMIT_SYNC"

            [handle]
            endpoint = "https://nosql.example.com"
            user_agent = "billing/1.0"

            [handle.auth]
            kind = "simulated"

            [query_cache]
            capacity = 50
            lifetime_ms = 1000
            "#
        )
        .unwrap();

        let config = NosqlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timestamp_precision, 6);
        assert_eq!(config.default_durability, Durability::CommitSync);
        assert_eq!(config.query_cache.capacity, 50);
        assert_eq!(
            config.handle_config().unwrap().user_agent.as_deref(),
            Some("billing/1.0")
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = NosqlConfig::from_file("/definitely/not/here/nosqlhaus.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
