//! Configuration loading and representation.

use std::time::Duration;

use thiserror::Error;

use admingate_auth::GuardConfig;

pub const ENV_VALIDATE_URL: &str = "ADMINGATE_VALIDATE_URL";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_TIER_TIMEOUT_MS: &str = "ADMINGATE_TIER_TIMEOUT_MS";
pub const ENV_CACHE_TTL_SECS: &str = "ADMINGATE_CACHE_TTL_SECS";
pub const ENV_DB_MAX_CONNECTIONS: &str = "ADMINGATE_DB_MAX_CONNECTIONS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("no validation tier configured (set ADMINGATE_VALIDATE_URL and/or DATABASE_URL)")]
    NoTiers,

    #[error("failed to build http client: {0}")]
    HttpClient(String),

    #[error("invalid database configuration: {0}")]
    Database(String),
}

/// Where the tiers live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraConfig {
    /// Tier 1 endpoint. Tier 1 is skipped when unset.
    pub validate_url: Option<String>,
    /// Postgres for Tiers 2 and 3. Both are skipped when unset.
    pub database_url: Option<String>,
    pub max_db_connections: u32,
    pub guard: GuardConfig,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            validate_url: None,
            database_url: None,
            max_db_connections: 5,
            guard: GuardConfig::default(),
        }
    }
}

impl InfraConfig {
    /// Load from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (unset and blank values use defaults).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self {
            validate_url: get(ENV_VALIDATE_URL),
            database_url: get(ENV_DATABASE_URL),
            ..Self::default()
        };

        if let Some(raw) = get(ENV_TIER_TIMEOUT_MS) {
            let ms = parse_positive(ENV_TIER_TIMEOUT_MS, &raw)?;
            config.guard = config.guard.with_tier_timeout(Duration::from_millis(ms));
        }
        if let Some(raw) = get(ENV_CACHE_TTL_SECS) {
            let secs = parse_positive(ENV_CACHE_TTL_SECS, &raw)?;
            config.guard = config.guard.with_cache_ttl(Duration::from_secs(secs));
        }
        if let Some(raw) = get(ENV_DB_MAX_CONNECTIONS) {
            let max = parse_positive(ENV_DB_MAX_CONNECTIONS, &raw)?;
            config.max_db_connections = u32::try_from(max).map_err(|e| ConfigError::Invalid {
                key: ENV_DB_MAX_CONNECTIONS,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason,
    };
    let value: u64 = raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if value == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(value)
}
