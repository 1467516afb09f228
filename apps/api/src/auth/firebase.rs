use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::auth::{AuthResult, Verifier, VerifyError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity Toolkit error messages that describe the token itself. Anything
/// else (bad API key, quota, malformed request) is a service fault.
const TOKEN_ERRORS: &[&str] = &[
    "INVALID_ID_TOKEN",
    "TOKEN_EXPIRED",
    "USER_NOT_FOUND",
    "USER_DISABLED",
];

fn is_token_error(message: &str) -> bool {
    TOKEN_ERRORS.iter().any(|code| message.starts_with(code))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LookupResponse {
    users: Vec<LookupUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LookupUser {
    local_id: String,
    display_name: Option<String>,
    photo_url: Option<String>,
    provider_user_info: Vec<ProviderUserInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProviderUserInfo {
    provider_id: String,
    raw_id: String,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Verifies Firebase ID tokens with the Identity Toolkit `accounts:lookup`
/// endpoint and reports the first linked sign-in provider as the identity.
#[derive(Clone)]
pub struct FirebaseVerifier {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FirebaseVerifier {
    pub fn new(api_key: String, base_url: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Verifier for FirebaseVerifier {
    async fn verify_id_token(&self, token: &str) -> Result<AuthResult, VerifyError> {
        let response = self
            .client
            .post(format!("{}/v1/accounts:lookup", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            if status.is_client_error() && is_token_error(&message) {
                debug!("Identity Toolkit rejected token: {message}");
                return Err(VerifyError::Rejected(message));
            }
            if status.is_client_error() {
                error!("Identity Toolkit refused lookup ({status}): {message}");
            } else {
                warn!("Identity Toolkit returned {status}: {message}");
            }
            return Err(VerifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let lookup: LookupResponse = response.json().await?;
        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| VerifyError::Rejected("no account for token".into()))?;
        let provider = user.provider_user_info.into_iter().next().ok_or_else(|| {
            VerifyError::Rejected(format!("account {} has no linked provider", user.local_id))
        })?;

        Ok(AuthResult {
            auth_provider: provider.provider_id,
            auth_uid: provider.raw_id,
            name: user
                .display_name
                .or(provider.display_name)
                .unwrap_or_default(),
            icon_url: user.photo_url.or(provider.photo_url).unwrap_or_default(),
        })
    }
}
