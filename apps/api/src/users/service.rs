use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{current_user, AuthToken};
use crate::errors::AppError;
use crate::models::{Empty, NewUser, User};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignInRequest {
    #[serde(alias = "token")]
    pub jwt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    pub name: String,
}

/// Verifies the token and creates the local user on first sign-in.
/// Later sign-ins only refresh the icon; the name is user-editable and kept.
pub async fn sign_in(state: &AppState, req: &SignInRequest) -> Result<Empty, AppError> {
    let identity = state.verifier.verify_id_token(&req.jwt).await?;

    let existing = state
        .store
        .find_user_by_auth(&identity.auth_provider, &identity.auth_uid)
        .await?;

    match existing {
        Some(user) => {
            state
                .store
                .update_user_icon(user.id, &identity.icon_url)
                .await?;
            info!("User {} signed in", user.id);
        }
        None => {
            let id = state
                .store
                .insert_user(&NewUser {
                    name: &identity.name,
                    icon_url: &identity.icon_url,
                    auth_provider: &identity.auth_provider,
                    auth_uid: &identity.auth_uid,
                })
                .await?;
            info!(
                "Created user {id} for {}/{}",
                identity.auth_provider, identity.auth_uid
            );
        }
    }

    Ok(Empty {})
}

pub async fn update_user(
    state: &AppState,
    token: &AuthToken,
    req: &UpdateUserRequest,
) -> Result<User, AppError> {
    let user = current_user(state, token).await?;

    if req.name.trim().is_empty() {
        return Err(AppError::InvalidArgument("name is blank".into()));
    }

    state.store.update_user_name(user.id, &req.name).await?;
    info!("User {} renamed", user.id);

    Ok(User {
        id: user.id,
        name: req.name.clone(),
        icon_url: user.icon_url,
    })
}
