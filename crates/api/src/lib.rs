//! HTTP API: configuration, authorization gate, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod middleware;

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;

use eslhub_infra::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};

use crate::app::AppServices;
use crate::config::AppConfig;

/// Open the configured document store. Fails fast when Postgres is configured
/// but unreachable.
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresDocumentStore::connect(url.expose_secret(), config.database_max_connections)
                .await
                .context("failed to connect to the document database")?;
            tracing::info!("connected to postgres document store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store, data will not persist");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}

/// Wire services over `store`: unique indexes first, then optional seeding.
pub async fn prepare_services(config: &AppConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<Arc<AppServices>> {
    let services = AppServices::new(config, store);
    services
        .ensure_indexes()
        .await
        .context("failed to ensure unique indexes")?;

    if config.seed_default_categories {
        services
            .categories
            .initialize()
            .await
            .context("failed to seed default categories")?;
    }

    Ok(Arc::new(services))
}
