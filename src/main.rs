mod config;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use config::{Config, StoreBackend};
use routes::tasks::{InMemoryTaskStore, PgTaskStore, TaskStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    let store = build_store(&config).await?;
    let state = state::AppState::new(store, config.expose_error_detail());

    let app = routes::routes().with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("failed to bind {}", config.addr()))?;

    tracing::info!("server is chilling at http://{}", config.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn TaskStore>> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory task store, data is lost on exit");
            Ok(Arc::new(InMemoryTaskStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL missing, it is required")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.operation_timeout)
                .connect(url)
                .await
                .context("Error connecting DB")?;

            let store = PgTaskStore::new(pool, config.operation_timeout);
            store
                .ensure_schema()
                .await
                .context("failed to create tasks table")?;

            tracing::info!(max_connections = config.max_connections, "connected to database");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
