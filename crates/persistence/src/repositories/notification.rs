//! Notification repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::NewLicenseNotification;
use sqlx::PgPool;

use crate::entities::{NotificationEntity, NotificationTierDb, NotificationWithCountEntity};
use crate::metrics::QueryTimer;

/// Repository for notification-related database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a notification row for a client.
    pub async fn create_notification(
        &self,
        client_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<NotificationEntity, sqlx::Error> {
        let _timer = QueryTimer::start("create_notification");
        sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (client_id, created_at)
            VALUES ($1, $2)
            RETURNING id, client_id, created_at
            "#,
        )
        .bind(client_id)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Bulk-insert dedup markers for a notification.
    ///
    /// The UNIQUE (license_id, tier) constraint makes this safe under
    /// concurrent scans: markers another writer recorded first are skipped,
    /// and the returned count reflects only the rows actually inserted.
    pub async fn record_license_notifications(
        &self,
        notification_id: i64,
        markers: &[NewLicenseNotification],
    ) -> Result<u64, sqlx::Error> {
        if markers.is_empty() {
            return Ok(0);
        }

        let license_ids: Vec<i64> = markers.iter().map(|m| m.license_id).collect();
        let tiers: Vec<String> = markers.iter().map(|m| m.tier.as_str().to_string()).collect();

        let _timer = QueryTimer::start("record_license_notifications");
        sqlx::query(
            r#"
            INSERT INTO license_notifications (notification_id, license_id, tier)
            SELECT $1, t.license_id, t.tier::notification_tier
            FROM UNNEST($2::bigint[], $3::text[]) AS t(license_id, tier)
            ON CONFLICT (license_id, tier) DO NOTHING
            "#,
        )
        .bind(notification_id)
        .bind(&license_ids)
        .bind(&tiers)
        .execute(&self.pool)
        .await
        .map(|result| result.rows_affected())
    }

    /// Check whether a (license, tier) marker already exists.
    pub async fn tier_exists(
        &self,
        license_id: i64,
        tier: domain::models::NotificationTier,
    ) -> Result<bool, sqlx::Error> {
        let _timer = QueryTimer::start("license_notification_tier_exists");
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM license_notifications
                WHERE license_id = $1 AND tier = $2
            )
            "#,
        )
        .bind(license_id)
        .bind(NotificationTierDb::from(tier))
        .fetch_one(&self.pool)
        .await
    }

    /// List the notification history with client names and marker counts,
    /// newest first.
    pub async fn list_with_counts(
        &self,
    ) -> Result<Vec<NotificationWithCountEntity>, sqlx::Error> {
        let _timer = QueryTimer::start("list_notifications_with_counts");
        sqlx::query_as::<_, NotificationWithCountEntity>(
            r#"
            SELECT
                n.id, n.client_id, c.client_name,
                COUNT(ln.id) AS expiring_license_count,
                n.created_at
            FROM notifications n
            JOIN clients c ON c.id = n.client_id
            LEFT JOIN license_notifications ln ON ln.notification_id = n.id
            GROUP BY n.id, n.client_id, c.client_name, n.created_at
            ORDER BY n.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
