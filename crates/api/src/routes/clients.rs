//! Client endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::{Client, ClientResponse, CreateClientRequest};
use persistence::repositories::ClientRepository;

/// Create a client.
///
/// POST /api/v1/clients
///
/// Contact data is validated here, at write time; a duplicate client name
/// is a conflict.
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    request.validate()?;

    let repo = ClientRepository::new(state.pool.clone());
    let entity = repo
        .create_client(
            &request.client_name,
            &request.poc_contact_name,
            &request.poc_contact_email,
            &request.admin_owner,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ClientResponse::from(Client::from(entity))),
    ))
}

/// List all clients.
///
/// GET /api/v1/clients
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let repo = ClientRepository::new(state.pool.clone());
    let clients = repo.list_clients().await?;

    Ok(Json(
        clients
            .into_iter()
            .map(|entity| ClientResponse::from(Client::from(entity)))
            .collect(),
    ))
}
