use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use domain::services::scan::ExpiryScanService;
use license_portal_api::jobs::{ExpiryScanJob, JobScheduler, PoolMetricsJob};
use license_portal_api::services::EmailService;
use license_portal_api::{app, config::Config, middleware};
use persistence::repositories::PgExpiryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics();

    info!("Starting License Portal API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let db_config = persistence::db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        connect_timeout_secs: config.database.connect_timeout_secs,
        idle_timeout_secs: config.database.idle_timeout_secs,
    };
    let pool = db_config.connect().await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Start background jobs
    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    if config.scan.enabled {
        let store = Arc::new(PgExpiryStore::new(pool.clone()));
        let mailer = Arc::new(EmailService::new(config.email.clone()));
        let scan = Arc::new(ExpiryScanService::new(store, mailer));
        scheduler.register(ExpiryScanJob::new(scan, config.scan.interval_minutes));
    }
    scheduler.start();

    // Build application
    let app = app::create_app(config.clone(), pool);

    // Start server
    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain background jobs before exiting
    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
    }
}
