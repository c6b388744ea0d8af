//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub spoonacular_api_key: String,
    pub spoonacular_base_url: String,
    pub storage_dir: PathBuf,
    pub upstream_timeout: Duration,
    pub store_timeout: Duration,
    pub enrich_concurrency: usize,
    pub cors_allowed_origin: String,
    pub environment: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds the configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).cloned();

        // --- Server and Database Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            var("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Ingredient Provider ---
        let spoonacular_api_key = var("SPOONACULAR_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("SPOONACULAR_API_KEY".to_string()))?;
        let spoonacular_base_url = var("SPOONACULAR_BASE_URL")
            .unwrap_or_else(|| "https://api.spoonacular.com".to_string())
            .trim_end_matches('/')
            .to_string();

        // --- Storage, Timeouts and Fan-out ---
        let storage_dir = var("SEARCH_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./storage/searches"));
        let upstream_timeout = Duration::from_secs(parse_number(&var, "UPSTREAM_TIMEOUT_SECS", 10)?);
        let store_timeout = Duration::from_secs(parse_number(&var, "STORE_TIMEOUT_SECS", 5)?);
        let enrich_concurrency = parse_number(&var, "ENRICH_CONCURRENCY", 10)?.clamp(1, 10) as usize;

        let cors_allowed_origin =
            var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());
        let environment = var("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            spoonacular_api_key,
            spoonacular_base_url,
            storage_dir,
            upstream_timeout,
            store_timeout,
            enrich_concurrency,
            cors_allowed_origin,
            environment,
        })
    }
}

fn parse_number(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match var(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(name.to_string(), format!("'{}' is not a positive number", raw))
            }),
    }
}
