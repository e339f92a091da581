//! Client domain model.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A client organization that holds licenses to packages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    /// Unique display name; clients are identified by name.
    pub client_name: String,
    pub poc_contact_name: String,
    pub poc_contact_email: String,
    /// Administrative owner reference (account management is external).
    pub admin_owner: String,
}

/// Request payload for creating a client.
///
/// Contact data is validated at write time so scans never encounter a
/// client without a usable point-of-contact address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(
        min = 2,
        max = 120,
        message = "Client name must be between 2 and 120 characters"
    ))]
    pub client_name: String,

    #[validate(length(
        min = 2,
        max = 120,
        message = "Contact name must be between 2 and 120 characters"
    ))]
    pub poc_contact_name: String,

    #[validate(email(message = "Contact email must be a valid email address"))]
    pub poc_contact_email: String,

    #[validate(length(
        min = 2,
        max = 120,
        message = "Admin owner must be between 2 and 120 characters"
    ))]
    pub admin_owner: String,
}

/// Response payload for client endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ClientResponse {
    pub id: i64,
    pub client_name: String,
    pub poc_contact_name: String,
    pub poc_contact_email: String,
    pub admin_owner: String,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            client_name: client.client_name,
            poc_contact_name: client.poc_contact_name,
            poc_contact_email: client.poc_contact_email,
            admin_owner: client.admin_owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateClientRequest {
        CreateClientRequest {
            client_name: "Client A".to_string(),
            poc_contact_name: "Client Admin A".to_string(),
            poc_contact_email: "poc@clienta.example.com".to_string(),
            admin_owner: "admin@portal.example.com".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes_validation() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_missing_poc_email_rejected_at_write_time() {
        let mut request = valid_request();
        request.poc_contact_email = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_malformed_poc_email_rejected() {
        let mut request = valid_request();
        request.poc_contact_email = "not-an-email".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_client_name_length_limits() {
        let mut request = valid_request();
        request.client_name = "x".to_string();
        assert!(request.validate().is_err());

        request.client_name = "x".repeat(121);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_client_response_from_client() {
        let client = Client {
            id: 7,
            client_name: "Client A".to_string(),
            poc_contact_name: "Client Admin A".to_string(),
            poc_contact_email: "poc@clienta.example.com".to_string(),
            admin_owner: "admin@portal.example.com".to_string(),
        };

        let response = ClientResponse::from(client);
        assert_eq!(response.id, 7);
        assert_eq!(response.client_name, "Client A");
    }
}
