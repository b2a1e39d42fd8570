use tracing_subscriber::EnvFilter;

use herbarium_api::auth::TokenService;
use herbarium_api::config::AppConfig;
use herbarium_api::state::AppState;
use herbarium_api::storage::ImageStore;
use herbarium_api::{app, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting in {} mode", config.environment);

    let tokens = TokenService::new(
        &config.security.jwt_secret,
        config.security.token_expiry_days,
    )?;

    let pool = database::create_pool(&config.database)?;
    if let Err(e) = database::run_migrations(&pool).await {
        // A cold database is survivable at startup; /health reports degraded
        tracing::warn!("migrations not applied: {}", e);
    }

    let images = ImageStore::new(config.upload.dir.clone())?;
    let port = config.server.port;

    let state = AppState::new(config, pool, tokens, images);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
