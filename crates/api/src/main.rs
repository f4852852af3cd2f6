use anyhow::Context;

use admingate_auth::ValidationChain;
use admingate_infra::{InfraConfig, build_database_tiers};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    admingate_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let config = InfraConfig::from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set for the validation endpoint")?;
    let tiers = build_database_tiers(&database_url, &config)?;
    let chain = ValidationChain::new(tiers).with_tier_timeout(config.guard.tier_timeout);

    let app = admingate_api::app::build_app(jwt_secret, chain);

    let bind_addr =
        std::env::var("ADMINGATE_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
