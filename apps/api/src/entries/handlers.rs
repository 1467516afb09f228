use axum::{extract::State, Json};

use crate::auth::AuthToken;
use crate::entries::service::{
    self, CreateEntryRequest, DeleteEntryRequest, ListEntriesRequest, ListEntriesResponse,
    UpdateEntryRequest,
};
use crate::errors::AppError;
use crate::models::{Empty, Entry};
use crate::state::AppState;

/// POST /adventar.v1.Adventar/ListEntries
pub async fn handle_list_entries(
    State(state): State<AppState>,
    Json(req): Json<ListEntriesRequest>,
) -> Result<Json<ListEntriesResponse>, AppError> {
    Ok(Json(service::list_entries(&state, &req).await?))
}

/// POST /adventar.v1.Adventar/CreateEntry
pub async fn handle_create_entry(
    State(state): State<AppState>,
    token: AuthToken,
    Json(req): Json<CreateEntryRequest>,
) -> Result<Json<Entry>, AppError> {
    Ok(Json(service::create_entry(&state, &token, &req).await?))
}

/// POST /adventar.v1.Adventar/UpdateEntry
pub async fn handle_update_entry(
    State(state): State<AppState>,
    token: AuthToken,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<Entry>, AppError> {
    Ok(Json(service::update_entry(&state, &token, &req).await?))
}

/// POST /adventar.v1.Adventar/DeleteEntry
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    token: AuthToken,
    Json(req): Json<DeleteEntryRequest>,
) -> Result<Json<Empty>, AppError> {
    Ok(Json(service::delete_entry(&state, &token, &req).await?))
}
