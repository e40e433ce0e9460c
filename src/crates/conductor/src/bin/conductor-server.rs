//! Conductor server binary
//!
//! Standalone server for the workflow execution engine: initializes storage,
//! runs migrations, and hosts the execution service until shutdown.

use std::sync::Arc;

use conductor::config::ServerConfig;
use conductor::db::DatabaseConnection;
use conductor::definition::CachedDefinitionProvider;
use conductor::execution::runner::SimulatedTaskRunner;
use conductor::services::WorkflowExecutionService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing/logging
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    // Load configuration, falling back to defaults
    let config = match ServerConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("Failed to load configuration file: {}. Using defaults.", e);
            ServerConfig::default()
        }
    };

    tracing::info!("Server name: {}", config.server.name);
    tracing::info!("Database path: {}", config.database.path);
    tracing::info!(
        "Task timeout: {}s, stream buffer: {}, definition cache TTL: {}s",
        config.engine.task_timeout_secs,
        config.engine.stream_buffer,
        config.engine.definition_cache_ttl_secs
    );

    // Initialize database connection
    let database_url = config.database_url();
    tracing::info!("Connecting to database: {}", database_url);
    let db = DatabaseConnection::new(&database_url).await?;

    // Run migrations and verify the database answers
    tracing::info!("Running database migrations");
    db.run_migrations().await?;
    db.health_check().await?;

    // Wire the engine collaborators
    let provider = Arc::new(CachedDefinitionProvider::new(
        db.pool().clone(),
        config.engine.cache_ttl(),
    ));
    let runner = Arc::new(SimulatedTaskRunner::default());
    let service =
        WorkflowExecutionService::new(db.pool().clone(), provider, runner, &config.engine);

    tracing::info!(
        "conductor {} ready, {} streams active",
        conductor::version(),
        service.publisher().active_streams()
    );

    // Run until a shutdown signal arrives
    shutdown_signal().await;

    drop(service);
    db.close().await;
    tracing::info!("conductor server shut down gracefully");
    Ok(())
}

/// Signal for graceful shutdown (Ctrl-C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
