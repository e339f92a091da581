use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{clients, health, licenses, notifications};
use crate::services::EmailService;
use domain::services::scan::ExpiryScanService;
use persistence::repositories::PgExpiryStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub scan: Arc<ExpiryScanService>,
}

impl AppState {
    /// Wire up shared state: the scan service runs against the pool-backed
    /// store and the configured email transport, same as the scheduled job.
    pub fn new(config: Arc<Config>, pool: PgPool) -> Self {
        let store = Arc::new(PgExpiryStore::new(pool.clone()));
        let mailer = Arc::new(EmailService::new(config.email.clone()));
        let scan = Arc::new(ExpiryScanService::new(store, mailer));

        Self { pool, config, scan }
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let state = AppState::new(config, pool);

    Router::new()
        // Health probes and metrics (public)
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        // Versioned API
        .route(
            "/api/v1/clients",
            post(clients::create_client).get(clients::list_clients),
        )
        .route(
            "/api/v1/clients/:client_id/licenses",
            get(licenses::list_client_licenses),
        )
        .route("/api/v1/licenses", post(licenses::create_license))
        .route(
            "/api/v1/licenses/check-expiry",
            post(licenses::check_expiry),
        )
        .route(
            "/api/v1/notifications",
            get(notifications::list_notifications),
        )
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
