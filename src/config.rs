use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_MAX_RESULTS: usize = 50;
const DEFAULT_MAX_RESULTS_CAP: usize = 200;
const DEFAULT_CANDIDATE_PREFILTER_KM: f64 = 500.0;

/// Tuning for location searches
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Result count when the caller does not ask for one
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Upper bound applied to any requested result count
    #[serde(default = "default_max_results_cap")]
    pub max_results_cap: usize,

    /// Smallest radius of the bounding box used to load candidates for radius-filtered
    /// searches; the box grows to the widest stored service radius
    #[serde(default = "default_candidate_prefilter_km")]
    pub candidate_prefilter_km: f64,

    /// Whether searches honour service radii unless the request says otherwise; `kind=space`
    /// searches rank plainly by default
    #[serde(default = "default_true_bool")]
    pub respect_service_radius_by_default: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            max_results_cap: default_max_results_cap(),
            candidate_prefilter_km: default_candidate_prefilter_km(),
            respect_service_radius_by_default: true,
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins; permissive when unset
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    #[validate(range(min = 1))]
    pub event_channel_capacity: usize,

    /// Location search tuning
    #[serde(default)]
    #[validate(custom = "validate_matching")]
    pub matching: MatchingConfig,

    /// Create a booking for the target profile when an interest is accepted
    #[serde(default = "default_true_bool")]
    pub auto_book_on_accept: bool,
}

impl AppConfig {
    /// Configuration with every optional field at its default.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
            matching: MatchingConfig::default(),
            auto_book_on_accept: true,
        }
    }

    /// Gets database URL reference
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Explicit CORS origins, if any are configured
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The in-memory store mode is selected with `database_url = "memory"`.
    pub fn uses_in_memory_store(&self) -> bool {
        self.database_url.eq_ignore_ascii_case("memory")
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_max_connections() -> u32 {
    16
}

fn default_db_min_connections() -> u32 {
    2
}

fn default_db_connect_timeout_secs() -> u64 {
    30
}

fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_max_results_cap() -> usize {
    DEFAULT_MAX_RESULTS_CAP
}

fn default_candidate_prefilter_km() -> f64 {
    DEFAULT_CANDIDATE_PREFILTER_KM
}

fn default_true_bool() -> bool {
    true
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_matching(matching: &MatchingConfig) -> Result<(), ValidationError> {
    if matching.max_results_cap == 0 || matching.default_max_results == 0 {
        let mut err = ValidationError::new("matching");
        err.message = Some("result limits must be greater than 0".into());
        return Err(err);
    }
    if matching.default_max_results > matching.max_results_cap {
        let mut err = ValidationError::new("matching");
        err.message = Some("default_max_results must not exceed max_results_cap".into());
        return Err(err);
    }
    if !matching.candidate_prefilter_km.is_finite() || matching.candidate_prefilter_km <= 0.0 {
        let mut err = ValidationError::new("matching");
        err.message = Some("candidate_prefilter_km must be a positive number".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("showmatch_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::new(filter_directive);
    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://showmatch.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig::new(
            "memory".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        )
    }

    #[test]
    fn defaults_validate() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.uses_in_memory_store());
        assert!(cfg.auto_book_on_accept);
        assert!(cfg.matching.respect_service_radius_by_default);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "verbose".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inconsistent_result_limits() {
        let mut cfg = base_config();
        cfg.matching.default_max_results = 500;
        assert!(cfg.validate().is_err());

        let mut cfg = base_config();
        cfg.matching.candidate_prefilter_km = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let mut cfg = base_config();
        cfg.cors_allowed_origins = Some(" https://a.example , ,https://b.example".into());
        assert_eq!(
            cfg.cors_origins(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn matching_block_deserializes_with_defaults() {
        let cfg = Config::builder()
            .set_default("database_url", "memory")
            .unwrap()
            .set_default("host", "0.0.0.0")
            .unwrap()
            .set_default("environment", "test")
            .unwrap()
            .set_default("matching.max_results_cap", 25)
            .unwrap()
            .build()
            .unwrap();
        let parsed: AppConfig = cfg.try_deserialize().unwrap();
        assert_eq!(parsed.matching.max_results_cap, 25);
        assert_eq!(parsed.matching.default_max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(parsed.port, DEFAULT_PORT);
    }
}
