//! Dynamic Pricing - product, discount and order pricing service

use std::sync::Arc;

use anyhow::Result;
use dynamic_pricing::{
    api::{self, AppState},
    config::AppConfig,
    publisher::EventPublisher,
    store::{MemoryStore, PgStore, Store},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AppConfig::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections).await?;
            store.migrate().await?;
            tracing::info!("using PostgreSQL store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let publisher = EventPublisher::connect(config.nats_url.as_deref()).await;
    let state = AppState::new(store, publisher, config.max_discount_percentage);

    let app = api::router(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(max_discount = %config.max_discount_percentage, "Dynamic Pricing listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
