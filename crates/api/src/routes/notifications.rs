//! Notification history endpoint handlers.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use domain::services::scan::ScanNotification;
use persistence::repositories::NotificationRepository;

/// Client reference embedded in a notification payload.
#[derive(Debug, Serialize)]
pub struct ClientRef {
    pub client_name: String,
}

/// Serialized notification: who was notified, about how many licenses,
/// and when.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub client: ClientRef,
    pub expiring_license_count: i64,
    pub created: DateTime<Utc>,
}

impl From<ScanNotification> for NotificationResponse {
    fn from(scan_notification: ScanNotification) -> Self {
        Self {
            client: ClientRef {
                client_name: scan_notification.client_name,
            },
            expiring_license_count: scan_notification.expiring_license_count as i64,
            created: scan_notification.notification.created_at,
        }
    }
}

/// List the notification history, newest first.
///
/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let repo = NotificationRepository::new(state.pool.clone());
    let notifications = repo.list_with_counts().await?;

    Ok(Json(
        notifications
            .into_iter()
            .map(|entity| NotificationResponse {
                client: ClientRef {
                    client_name: entity.client_name,
                },
                expiring_license_count: entity.expiring_license_count,
                created: entity.created_at,
            })
            .collect(),
    ))
}
