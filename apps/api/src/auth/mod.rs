//! Caller identity.
//!
//! Bearer tokens are resolved by a pluggable `Verifier` to an external
//! identity, which is then mapped to a local user row. Only `SignIn` creates
//! users; every other authenticated method requires a completed sign-in.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use thiserror::Error;

use crate::errors::AppError;
use crate::models::UserRow;
use crate::state::AppState;

pub mod firebase;

pub use firebase::FirebaseVerifier;

/// Identity resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub auth_provider: String,
    pub auth_uid: String,
    pub name: String,
    pub icon_url: String,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Token rejected: {0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Resolves an opaque bearer token to an external identity.
///
/// Carried in `AppState` as `Arc<dyn Verifier>`.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify_id_token(&self, token: &str) -> Result<AuthResult, VerifyError>;
}

/// The `authorization` header of a request, with any `Bearer ` prefix removed.
/// Never rejects: methods that need a caller fail later in `current_user`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthToken(pub Option<String>);

impl AuthToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(strip_bearer)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Ok(AuthToken(token))
    }
}

/// Drops a case-insensitive `Bearer` scheme. A bare scheme yields an empty
/// token; proxies strip the trailing space of `Bearer `.
fn strip_bearer(value: &str) -> &str {
    let value = value.trim_start();
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.trim_end().eq_ignore_ascii_case("bearer") => "",
        _ => value.trim(),
    }
}

/// Resolves the caller to a signed-in local user.
pub async fn current_user(state: &AppState, token: &AuthToken) -> Result<UserRow, AppError> {
    let token = token
        .as_deref()
        .ok_or_else(|| AppError::Unauthenticated("authorization not found in metadata".into()))?;

    let identity = state.verifier.verify_id_token(token).await?;

    state
        .store
        .find_user_by_auth(&identity.auth_provider, &identity.auth_uid)
        .await?
        .ok_or_else(|| {
            AppError::Unauthenticated(format!(
                "no user for {}/{}; sign in first",
                identity.auth_provider, identity.auth_uid
            ))
        })
}
