//! License repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::{LicenseEntity, LicenseKindDb, PackageDb};
use crate::metrics::QueryTimer;

/// Repository for license-related database operations.
#[derive(Clone)]
pub struct LicenseRepository {
    pool: PgPool,
}

impl LicenseRepository {
    /// Creates a new LicenseRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new license. The caller supplies the expiration; default
    /// term handling happens at the API layer.
    pub async fn create_license(
        &self,
        client_id: i64,
        package: PackageDb,
        kind: LicenseKindDb,
        expires_at: DateTime<Utc>,
    ) -> Result<LicenseEntity, sqlx::Error> {
        let _timer = QueryTimer::start("create_license");
        sqlx::query_as::<_, LicenseEntity>(
            r#"
            INSERT INTO licenses (client_id, package, kind, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, client_id, package, kind, created_at, expires_at
            "#,
        )
        .bind(client_id)
        .bind(package)
        .bind(kind)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    /// List all licenses held by a client.
    pub async fn list_for_client(&self, client_id: i64) -> Result<Vec<LicenseEntity>, sqlx::Error> {
        let _timer = QueryTimer::start("list_licenses_for_client");
        sqlx::query_as::<_, LicenseEntity>(
            r#"
            SELECT id, client_id, package, kind, created_at, expires_at
            FROM licenses
            WHERE client_id = $1
            ORDER BY expires_at
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }
}
