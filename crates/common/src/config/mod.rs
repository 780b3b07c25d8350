//! Configuration management for ClassDesk services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Legacy `MONGO_URI` and `PORT` variables
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Upload storage configuration
    #[serde(default)]
    pub uploads: UploadConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// Maximum request body size (multipart uploads included)
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Which `DocumentStore` implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Store backend
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// MongoDB connection string
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Database name
    #[serde(default = "default_database_name")]
    pub name: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum connections in the driver pool
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Directory uploaded files are written to
    #[serde(default = "default_upload_dir")]
    pub dir: String,

    /// Maximum images per assessment
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Maximum size of a single image
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,

    /// URL prefix files are served under
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second (global)
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_concurrent() -> usize { 100 }
fn default_body_limit() -> usize { 25 * 1024 * 1024 }
fn default_backend() -> StoreBackend { StoreBackend::Mongodb }
fn default_database_url() -> String { "mongodb://localhost:27017".to_string() }
fn default_database_name() -> String { "classdesk".to_string() }
fn default_connect_timeout() -> u64 { 10 }
fn default_max_pool_size() -> u32 { 20 }
fn default_upload_dir() -> String { "uploads".to_string() }
fn default_max_files() -> usize { 5 }
fn default_max_file_bytes() -> usize { 5 * 1024 * 1024 }
fn default_public_prefix() -> String { "/uploads".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_service_name() -> String { "classdesk".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_concurrent_requests: default_max_concurrent(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_database_url(),
            name: default_database_name(),
            connect_timeout_secs: default_connect_timeout(),
            max_pool_size: default_max_pool_size(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_files: default_max_files(),
            max_file_bytes: default_max_file_bytes(),
            public_prefix: default_public_prefix(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
            metrics_enabled: default_enabled(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=5001
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            // Variables the original deployment used
            .set_override_option("database.url", std::env::var("MONGO_URI").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?

            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.enabled && (self.rate_limit.requests_per_second == 0 || self.rate_limit.burst == 0) {
            return Err(ConfigError::Message(
                "rate_limit.requests_per_second and rate_limit.burst must be positive".to_string(),
            ));
        }
        if self.uploads.max_files == 0 {
            return Err(ConfigError::Message("uploads.max_files must be positive".to_string()));
        }
        if self.server.max_concurrent_requests == 0 {
            return Err(ConfigError::Message(
                "server.max_concurrent_requests must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            uploads: UploadConfig::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
