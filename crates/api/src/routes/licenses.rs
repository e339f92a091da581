//! License endpoint handlers, including the expiry scan trigger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_failed_emails, record_notifications_created};
use crate::routes::notifications::NotificationResponse;
use domain::models::{default_expiry, CreateLicenseRequest, License, LicenseResponse};
use persistence::repositories::{ClientRepository, LicenseRepository};

/// Create a license for a client.
///
/// POST /api/v1/licenses
///
/// A missing expiration defaults to creation time plus the standard term.
pub async fn create_license(
    State(state): State<AppState>,
    Json(request): Json<CreateLicenseRequest>,
) -> Result<(StatusCode, Json<LicenseResponse>), ApiError> {
    let expires_at = request
        .expires_at
        .unwrap_or_else(|| default_expiry(Utc::now()));

    let repo = LicenseRepository::new(state.pool.clone());
    let entity = repo
        .create_license(
            request.client_id,
            request.package.into(),
            request.kind.into(),
            expires_at,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LicenseResponse::from(License::from(entity))),
    ))
}

/// List the licenses held by a client.
///
/// GET /api/v1/clients/:client_id/licenses
pub async fn list_client_licenses(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<LicenseResponse>>, ApiError> {
    ClientRepository::new(state.pool.clone())
        .find_by_id(client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    let licenses = LicenseRepository::new(state.pool.clone())
        .list_for_client(client_id)
        .await?;

    Ok(Json(
        licenses
            .into_iter()
            .map(|entity| LicenseResponse::from(License::from(entity)))
            .collect(),
    ))
}

/// Trigger an expiry scan.
///
/// POST /api/v1/licenses/check-expiry
///
/// Runs one scan pass and returns the notifications it created; an empty
/// list when no client was due. Send failures are logged and counted but do
/// not fail the request, since the dedup markers are already persisted.
pub async fn check_expiry(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<NotificationResponse>>), ApiError> {
    let outcome = state.scan.run_scan(Utc::now()).await?;

    record_notifications_created(outcome.notifications.len());
    record_failed_emails(outcome.failed_emails);

    let notifications: Vec<NotificationResponse> = outcome
        .notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok((StatusCode::CREATED, Json(notifications)))
}
