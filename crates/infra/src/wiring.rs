//! Assemble the tier chain from configuration.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use admingate_auth::{AdminGuard, IdentityProvider, TierValidator};

use crate::config::{ConfigError, InfraConfig};
use crate::postgres::{DirectQueryValidator, RpcValidator};
use crate::remote::RemoteValidator;

/// Tiers in priority order, skipping those without configuration.
///
/// The pool is created lazily: no connection is made until the first query,
/// so a database outage surfaces as a tier failure, not a startup failure.
pub fn build_tiers(
    config: &InfraConfig,
    identity: Arc<dyn IdentityProvider>,
) -> Result<Vec<Arc<dyn TierValidator>>, ConfigError> {
    let mut tiers: Vec<Arc<dyn TierValidator>> = Vec::new();

    if let Some(url) = &config.validate_url {
        let remote = RemoteValidator::new(url, identity, config.guard.tier_timeout)?;
        tiers.push(Arc::new(remote));
    }

    if let Some(database_url) = &config.database_url {
        tiers.extend(build_database_tiers(database_url, config)?);
    }

    if tiers.is_empty() {
        return Err(ConfigError::NoTiers);
    }

    tracing::info!(
        tiers = ?tiers.iter().map(|t| t.tier()).collect::<Vec<_>>(),
        "admin validation chain configured"
    );
    Ok(tiers)
}

/// Tiers 2 and 3 over one lazily connected pool.
///
/// Also used server-side by the validation endpoint, which has no Tier 1.
pub fn build_database_tiers(
    database_url: &str,
    config: &InfraConfig,
) -> Result<Vec<Arc<dyn TierValidator>>, ConfigError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .acquire_timeout(config.guard.tier_timeout)
        .connect_lazy(database_url)
        .map_err(|e| ConfigError::Database(e.to_string()))?;
    let tiers: Vec<Arc<dyn TierValidator>> = vec![
        Arc::new(RpcValidator::new(pool.clone())),
        Arc::new(DirectQueryValidator::new(pool)),
    ];
    Ok(tiers)
}

/// Guard with an in-memory cache over the configured tiers.
pub fn build_guard(
    config: &InfraConfig,
    identity: Arc<dyn IdentityProvider>,
) -> Result<AdminGuard, ConfigError> {
    let tiers = build_tiers(config, identity.clone())?;
    Ok(AdminGuard::with_config(identity, tiers, &config.guard))
}
