//! Client repository for database operations.

use sqlx::PgPool;

use crate::entities::ClientEntity;
use crate::metrics::QueryTimer;

/// Repository for client-related database operations.
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Creates a new ClientRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new client.
    pub async fn create_client(
        &self,
        client_name: &str,
        poc_contact_name: &str,
        poc_contact_email: &str,
        admin_owner: &str,
    ) -> Result<ClientEntity, sqlx::Error> {
        let _timer = QueryTimer::start("create_client");
        sqlx::query_as::<_, ClientEntity>(
            r#"
            INSERT INTO clients (client_name, poc_contact_name, poc_contact_email, admin_owner)
            VALUES ($1, $2, $3, $4)
            RETURNING id, client_name, poc_contact_name, poc_contact_email, admin_owner
            "#,
        )
        .bind(client_name)
        .bind(poc_contact_name)
        .bind(poc_contact_email)
        .bind(admin_owner)
        .fetch_one(&self.pool)
        .await
    }

    /// Find client by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ClientEntity>, sqlx::Error> {
        let _timer = QueryTimer::start("find_client_by_id");
        sqlx::query_as::<_, ClientEntity>(
            r#"
            SELECT id, client_name, poc_contact_name, poc_contact_email, admin_owner
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List all clients ordered by name.
    pub async fn list_clients(&self) -> Result<Vec<ClientEntity>, sqlx::Error> {
        let _timer = QueryTimer::start("list_clients");
        sqlx::query_as::<_, ClientEntity>(
            r#"
            SELECT id, client_name, poc_contact_name, poc_contact_email, admin_owner
            FROM clients
            ORDER BY client_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    // Note: ClientRepository tests require a database connection and are
    // covered by integration tests.
}
