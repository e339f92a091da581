//! Postgres-backed expiry store.
//!
//! Implements the scan's store contract on top of the repositories. The
//! candidate selection pushes the due windows into SQL: a client query
//! guarded by `EXISTS`, then a per-client prefetch of the due licenses.
//! Both share the same window condition, which mirrors
//! [`due_window`](domain::services::expiry::due_window) and must be kept in
//! sync with it.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Months, Utc, Weekday};
use sqlx::PgPool;

use domain::models::{NewLicenseNotification, Notification};
use domain::services::scan::{ExpiryCandidate, ExpiryStore, StoreError};

use crate::entities::{ClientEntity, LicenseEntity};
use crate::metrics::QueryTimer;
use crate::repositories::NotificationRepository;

/// A license is due when one of the tier windows matches and no dedup
/// marker exists for that window's tier.
const DUE_LICENSE_CONDITION: &str = r#"
    (
        l.expires_at > $1 AND l.expires_at < $2
        AND NOT EXISTS (
            SELECT 1 FROM license_notifications ln
            WHERE ln.license_id = l.id AND ln.tier = 'four_month'
        )
    )
    OR (
        l.expires_at <= $3
        AND NOT EXISTS (
            SELECT 1 FROM license_notifications ln
            WHERE ln.license_id = l.id AND ln.tier = 'one_week'
        )
    )
    OR (
        $4 AND l.expires_at > $3 AND l.expires_at < $5
        AND NOT EXISTS (
            SELECT 1 FROM license_notifications ln
            WHERE ln.license_id = l.id AND ln.tier = 'one_month'
        )
    )
"#;

/// Window bounds computed once per scan pass.
struct WindowBounds {
    four_month_lower: DateTime<Utc>,
    four_month_upper: DateTime<Utc>,
    one_week_upper: DateTime<Utc>,
    one_month_upper: DateTime<Utc>,
    monday: bool,
}

impl WindowBounds {
    fn at(now: DateTime<Utc>) -> Self {
        let four_months_out = now + Months::new(4);
        Self {
            four_month_lower: four_months_out - Duration::days(1),
            four_month_upper: four_months_out + Duration::days(1),
            one_week_upper: now + Duration::days(7),
            one_month_upper: now + Months::new(1),
            monday: now.weekday() == Weekday::Mon,
        }
    }
}

/// Postgres implementation of the scan's store contract.
#[derive(Clone)]
pub struct PgExpiryStore {
    pool: PgPool,
}

impl PgExpiryStore {
    /// Creates a new PgExpiryStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn clients_with_due_licenses(
        &self,
        bounds: &WindowBounds,
    ) -> Result<Vec<ClientEntity>, sqlx::Error> {
        let _timer = QueryTimer::start("clients_with_due_licenses");
        let query = format!(
            r#"
            SELECT c.id, c.client_name, c.poc_contact_name, c.poc_contact_email, c.admin_owner
            FROM clients c
            WHERE EXISTS (
                SELECT 1 FROM licenses l
                WHERE l.client_id = c.id AND ({DUE_LICENSE_CONDITION})
            )
            "#
        );
        sqlx::query_as::<_, ClientEntity>(&query)
            .bind(bounds.four_month_lower)
            .bind(bounds.four_month_upper)
            .bind(bounds.one_week_upper)
            .bind(bounds.monday)
            .bind(bounds.one_month_upper)
            .fetch_all(&self.pool)
            .await
    }

    async fn due_licenses_for_client(
        &self,
        client_id: i64,
        bounds: &WindowBounds,
    ) -> Result<Vec<LicenseEntity>, sqlx::Error> {
        let _timer = QueryTimer::start("due_licenses_for_client");
        let query = format!(
            r#"
            SELECT DISTINCT l.id, l.client_id, l.package, l.kind, l.created_at, l.expires_at
            FROM licenses l
            WHERE l.client_id = $6 AND ({DUE_LICENSE_CONDITION})
            "#
        );
        sqlx::query_as::<_, LicenseEntity>(&query)
            .bind(bounds.four_month_lower)
            .bind(bounds.four_month_upper)
            .bind(bounds.one_week_upper)
            .bind(bounds.monday)
            .bind(bounds.one_month_upper)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await
    }
}

#[async_trait]
impl ExpiryStore for PgExpiryStore {
    async fn candidates(&self, now: DateTime<Utc>) -> Result<Vec<ExpiryCandidate>, StoreError> {
        let bounds = WindowBounds::at(now);
        let clients = self.clients_with_due_licenses(&bounds).await?;

        let mut candidates = Vec::with_capacity(clients.len());
        for client in clients {
            let licenses = self.due_licenses_for_client(client.id, &bounds).await?;
            candidates.push(ExpiryCandidate {
                client: client.into(),
                expiring_licenses: licenses.into_iter().map(Into::into).collect(),
            });
        }
        Ok(candidates)
    }

    async fn create_notification(
        &self,
        client_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Notification, StoreError> {
        let entity = NotificationRepository::new(self.pool.clone())
            .create_notification(client_id, now)
            .await?;
        Ok(entity.into())
    }

    async fn record_license_notifications(
        &self,
        notification_id: i64,
        markers: &[NewLicenseNotification],
    ) -> Result<u64, StoreError> {
        let recorded = NotificationRepository::new(self.pool.clone())
            .record_license_notifications(notification_id, markers)
            .await?;
        Ok(recorded)
    }
}
