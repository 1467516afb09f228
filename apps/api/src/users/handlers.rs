use axum::{extract::State, Json};

use crate::auth::AuthToken;
use crate::errors::AppError;
use crate::models::{Empty, User};
use crate::state::AppState;
use crate::users::service::{self, SignInRequest, UpdateUserRequest};

/// POST /adventar.v1.Adventar/SignIn
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Empty>, AppError> {
    Ok(Json(service::sign_in(&state, &req).await?))
}

/// POST /adventar.v1.Adventar/UpdateUser
pub async fn handle_update_user(
    State(state): State<AppState>,
    token: AuthToken,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    Ok(Json(service::update_user(&state, &token, &req).await?))
}
