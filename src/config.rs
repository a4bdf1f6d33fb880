use crate::error::{AppError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Report generation limits and defaults
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Data source configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load_from(&config_path)
    }

    /// Load the embedded defaults, then `config_path` if it exists, then the
    /// environment. Out-of-range reporting values are a validation error.
    pub fn load_from(config_path: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(config_path).required(false))
            // Override with environment variables (prefix: MAINT_REPORTS_)
            .add_source(
                config::Environment::with_prefix("MAINT_REPORTS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.reporting.validate()?;
        Ok(config)
    }

    /// Defaults to run with after `load` failed.
    ///
    /// A source that could not be read or parsed falls back to defaults.
    /// Values that were read but are out of range are returned as the error.
    pub fn fallback(err: AppError) -> Result<Self> {
        match err {
            AppError::Validation(_) => Err(err),
            _ => Ok(Self::default()),
        }
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportingConfig {
    /// Deadline for a single store query (milliseconds)
    #[serde(default = "default_query_timeout_ms")]
    #[validate(range(min = 1))]
    pub query_timeout_ms: u64,

    /// Start of the activity report when no date_from is given
    #[serde(default = "default_activity_from")]
    pub activity_default_from: NaiveDate,

    /// Periods returned by the activity report
    #[serde(default = "default_max_buckets")]
    #[validate(range(min = 1))]
    pub max_activity_buckets: usize,

    /// Months returned in the general summary's evolution
    #[serde(default = "default_max_buckets")]
    #[validate(range(min = 1))]
    pub max_evolution_months: usize,

    /// Months returned in the performance report's productivity series
    #[serde(default = "default_productivity_months")]
    #[validate(range(min = 1, max = 120))]
    pub productivity_months: usize,
}

impl ReportingConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
            activity_default_from: default_activity_from(),
            max_activity_buckets: default_max_buckets(),
            max_evolution_months: default_max_buckets(),
            productivity_months: default_productivity_months(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    /// JSON fixture used to seed the in-memory store
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_query_timeout_ms() -> u64 {
    8000
}

fn default_activity_from() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn default_max_buckets() -> usize {
    12
}

fn default_productivity_months() -> usize {
    6
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "maintenance-reports".to_string()
}
