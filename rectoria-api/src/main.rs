//! # Rectoría API Server
//!
//! Admin backend for the Rectoría scheduling system.
//!
//! ## Usage
//!
//! ```bash
//! JWT_LLAVE_SECRETA=... cargo run -p rectoria-api
//! ```
//!
//! With `DATABASE_URL` (or the `USUARIO`/`HOST`/`BASE_DE_DATOS` settings)
//! the server syncs the schema and stores entities in PostgreSQL; otherwise
//! it runs on the in-memory store.

use std::sync::Arc;

use anyhow::Context;
use rectoria_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use rectoria_shared::{
    data_access::DataAccess,
    db::{
        pool::{close_pool, create_pool, PoolConfig},
        schema::sync_schema,
    },
    registry::Registry,
    store::{MemoryStore, PgStore, Store},
};
use sqlx::PgPool;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "Rectoría API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if config.has_weak_secret() {
        tracing::warn!("JWT_LLAVE_SECRETA is shorter than 32 bytes");
    }

    let registry = Arc::new(Registry::new().context("Invalid entity registry")?);

    let (store, pool): (Arc<dyn Store>, Option<PgPool>) = match &config.database {
        Some(database) => {
            let pool = create_pool(&PoolConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                ..Default::default()
            })
            .await
            .context("Failed to connect to the database")?;

            sync_schema(&pool, &registry)
                .await
                .context("Failed to sync the database schema")?;
            tracing::info!("Database schema synced");

            (Arc::new(PgStore::new(pool.clone())) as Arc<dyn Store>, Some(pool))
        }
        None => {
            tracing::warn!("No database configured, using the in-memory store");
            (Arc::new(MemoryStore::new()) as Arc<dyn Store>, None)
        }
    };

    let address = config.bind_address();
    let state = AppState::new(DataAccess::new(registry, store), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "rectoria_api=debug,rectoria_shared=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, exiting...");
}
