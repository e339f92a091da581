//! Prometheus metrics: exporter setup, HTTP middleware, business counters.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Call once at startup, before
/// anything records a metric.
pub fn init_metrics() {
    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])
        .expect("Failed to set histogram buckets")
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        panic!("Prometheus recorder already installed");
    }
}

/// Records `http_requests_total` and `http_request_duration_seconds` for
/// every request, labeled with the method and the matched route.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let started_at = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(started_at.elapsed().as_secs_f64());

    response
}

/// Record notifications created by a scan pass.
pub fn record_notifications_created(count: usize) {
    counter!("expiry_notifications_created_total").increment(count as u64);
}

/// Record expiry emails that failed to send.
pub fn record_failed_emails(count: usize) {
    counter!("expiry_emails_failed_total").increment(count as u64);
}

/// GET /metrics handler rendering the Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            [(axum::http::header::CONTENT_TYPE, "text/plain")],
            "Metrics recorder not installed".to_string(),
        ),
    }
}
