use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platewatch_api::config::{LogFormat, ServerConfig, StoreBackend};
use platewatch_api::router::build_app_router;
use platewatch_api::state::AppState;
use platewatch_db::store::{InMemorySightingStore, PgSightingStore, SightingStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store,
        "Loaded server configuration",
    );

    // --- Sighting store ---
    let store = build_store(&config).await;

    // --- App state ---
    let state = AppState::new(Arc::clone(&store));

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(shutdown_timeout, store.close())
        .await
        .is_err()
    {
        tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Sighting store did not close in time",
        );
    } else {
        tracing::info!(backend = store.backend(), "Sighting store closed");
    }

    tracing::info!("Graceful shutdown complete");
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "platewatch_api=debug,platewatch_db=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Build the configured store.
///
/// An unreachable database does not stop startup: the pool connects lazily
/// and the service runs degraded until the database comes back.
async fn build_store(config: &ServerConfig) -> Arc<dyn SightingStore> {
    match config.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory sighting store");
            Arc::new(InMemorySightingStore::new())
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            let pool = platewatch_db::create_pool(database_url, &config.pool)
                .expect("Invalid DATABASE_URL");
            tracing::info!(
                max_connections = config.pool.max_connections,
                "Database connection pool created",
            );

            match platewatch_db::health_check(&pool).await {
                Ok(()) => {
                    tracing::info!("Database health check passed");
                    match platewatch_db::run_migrations(&pool).await {
                        Ok(()) => tracing::info!("Database migrations applied"),
                        Err(e) => tracing::warn!(error = %e, "Database migrations failed"),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Database unreachable, starting in degraded mode");
                }
            }

            Arc::new(PgSightingStore::new(pool))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
