//! Client entity (database row mapping).

use domain::models::Client;
use sqlx::FromRow;

/// Database row mapping for the clients table.
#[derive(Debug, Clone, FromRow)]
pub struct ClientEntity {
    pub id: i64,
    pub client_name: String,
    pub poc_contact_name: String,
    pub poc_contact_email: String,
    pub admin_owner: String,
}

impl From<ClientEntity> for Client {
    fn from(entity: ClientEntity) -> Self {
        Self {
            id: entity.id,
            client_name: entity.client_name,
            poc_contact_name: entity.poc_contact_name,
            poc_contact_email: entity.poc_contact_email,
            admin_owner: entity.admin_owner,
        }
    }
}
