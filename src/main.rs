use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use torrent_catalog::{
    api,
    bootstrap::{self, BootstrapOutcome},
    categories::Categories,
    config::Config,
    ingest,
    storage::Database,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "torrent-catalog starting");

    let config = Config::load()?;

    let db = Database::open(&config.server.data_dir)?;
    info!("Database opened at: {}", config.server.data_dir);

    // Seed the catalog before any request can observe it
    let csv_path = config.ingest.csv_path.clone();
    let chunk_size = config.ingest.chunk_size;
    let outcome = {
        let db = db.clone();
        tokio::task::spawn_blocking(move || {
            bootstrap::ensure_seeded(&db, |store| {
                ingest::ingest_path(store, &csv_path, chunk_size)
            })
        })
        .await??
    };
    if outcome == BootstrapOutcome::SeedFailed {
        tracing::warn!("Serving an incomplete catalog");
    }

    let state = Arc::new(AppState {
        categories: Categories::builtin(),
        config: config.clone(),
        db,
    });

    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
