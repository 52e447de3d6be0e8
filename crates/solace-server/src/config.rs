use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

use solace_core::security::ApiKey;
use solace_store::retention::DEFAULT_RETENTION_DAYS;

use crate::server::ServerConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Upper bound for `SOLACE_RETENTION_DAYS`; larger values are clamped.
pub const MAX_RETENTION_DAYS: u32 = 36_500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Process-wide settings, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_path: PathBuf,
    /// `None` disables generation; every turn gets the fallback reply.
    pub openai_api_key: Option<ApiKey>,
    pub openai_base_url: String,
    pub model: String,
    pub generation_timeout: Duration,
    pub retention_days: u32,
    pub run_retention_sweep: bool,
    pub log_level: Level,
    /// Full VADER lexicon file; the built-in table is used when unset.
    pub vader_lexicon: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database_path: solace_telemetry::solace_home().join("database/solace.db"),
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            generation_timeout: Duration::from_secs(30),
            retention_days: DEFAULT_RETENTION_DAYS,
            run_retention_sweep: true,
            log_level: Level::INFO,
            vader_lexicon: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = get("SOLACE_PORT") {
            config.server.port = parse("SOLACE_PORT", &port)?;
        }
        if let Some(path) = get("SOLACE_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        config.openai_api_key = get("OPENAI_API_KEY").map(ApiKey::new);
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.openai_base_url = url;
        }
        if let Some(model) = get("SOLACE_MODEL") {
            config.model = model;
        }
        if let Some(secs) = get("SOLACE_GENERATION_TIMEOUT_SECS") {
            config.generation_timeout = Duration::from_secs(parse("SOLACE_GENERATION_TIMEOUT_SECS", &secs)?);
        }
        if let Some(days) = get("SOLACE_RETENTION_DAYS") {
            let days: u32 = parse("SOLACE_RETENTION_DAYS", &days)?;
            config.retention_days = days.min(MAX_RETENTION_DAYS);
        }
        if let Some(level) = get("SOLACE_LOG_LEVEL") {
            config.log_level = parse("SOLACE_LOG_LEVEL", &level)?;
        }
        config.vader_lexicon = get("SOLACE_VADER_LEXICON").map(PathBuf::from);

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}
