//! Health and readiness endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

use crate::app::AppState;

/// Full health report.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
}

/// Database reachability and round-trip latency.
#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Minimal probe response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Round-trip a trivial query, returning the latency when the database
/// answers.
async fn ping_database(state: &AppState) -> Option<u64> {
    let started_at = Instant::now();
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .ok()
        .map(|_| started_at.elapsed().as_millis() as u64)
}

/// Full health check.
///
/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let latency_ms = ping_database(&state).await;
    let reachable = latency_ms.is_some();

    let response = HealthResponse {
        status: if reachable { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            reachable,
            latency_ms,
        },
    };

    let code = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}

/// Liveness probe: the process is up.
///
/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse { status: "alive" })
}

/// Readiness probe: the service can reach its database.
///
/// GET /api/health/ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    if ping_database(&state).await.is_some() {
        (StatusCode::OK, Json(StatusResponse { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse { status: "not_ready" }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.3.0",
            database: DatabaseHealth {
                reachable: true,
                latency_ms: Some(4),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"]["reachable"], true);
        assert_eq!(json["database"]["latency_ms"], 4);
    }

    #[test]
    fn test_unreachable_database_omits_latency() {
        let response = HealthResponse {
            status: "unhealthy",
            version: "0.3.0",
            database: DatabaseHealth {
                reachable: false,
                latency_ms: None,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert!(json["database"].get("latency_ms").is_none());
    }

    #[test]
    fn test_status_response_serialization() {
        let json = serde_json::to_string(&StatusResponse { status: "alive" }).unwrap();
        assert_eq!(json, r#"{"status":"alive"}"#);
    }
}
