//! Mango Commerce - catalog and shopping cart service

use std::sync::Arc;

use anyhow::Result;
use mango_commerce::{api, AppConfig, AppState, EventPublisher, MemoryStore, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let events = match &config.nats_url {
        Some(url) => match EventPublisher::connect(url).await {
            Ok(publisher) => {
                tracing::info!(nats_url = %url, "publishing cart events to NATS");
                publisher
            }
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, cart events disabled");
                EventPublisher::disabled()
            }
        },
        None => EventPublisher::disabled(),
    };

    let state = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.max_connections).await?;
            store.migrate().await?;
            AppState::new(Arc::new(store), events, config.api_token.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            AppState::new(Arc::new(MemoryStore::new()), events, config.api_token.clone())
        }
    };
    if state.api_token.is_none() {
        tracing::warn!("API_TOKEN not set, bearer token check disabled");
    }

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "mango-commerce listening");
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
