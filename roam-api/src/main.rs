use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use roam_api::{app, AppState};
use roam_market::MarketplaceLimits;
use roam_store::app_config::Config;
use roam_store::{
    DbClient, StoreCollectionRepository, StoreCreatorRepository,
    StoreItineraryRepository, StoreProfileRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roam_api=debug,roam_market=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Roam API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;
    let pool = db.pool.clone();

    let app_state = AppState {
        itineraries: Arc::new(StoreItineraryRepository::new(pool.clone())),
        creators: Arc::new(StoreCreatorRepository::new(pool.clone())),
        collections: Arc::new(StoreCollectionRepository::new(pool.clone())),
        profiles: Arc::new(StoreProfileRepository::new(pool)),
        limits: MarketplaceLimits {
            featured: config.marketplace.featured_limit,
            trending: config.marketplace.trending_limit,
            creators: config.marketplace.creators_limit,
        },
        default_cover_image: config.collections.default_cover_image.clone(),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state)).await?;

    Ok(())
}
