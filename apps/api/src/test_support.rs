//! Fakes and fixtures shared by the service and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::{AuthResult, AuthToken, Verifier, VerifyError};
use crate::metadata::{FetchError, MetaFetcher, SiteMeta};
use crate::models::UserRow;
use crate::state::AppState;
use crate::store::MemoryStore;

pub const PROVIDER: &str = "github.com";

/// Accepts only the tokens registered with `allow`.
#[derive(Default)]
pub struct StaticVerifier {
    tokens: Mutex<HashMap<String, AuthResult>>,
}

impl StaticVerifier {
    pub fn allow(&self, token: &str, provider: &str, uid: &str, name: &str) {
        self.allow_identity(
            token,
            AuthResult {
                auth_provider: provider.to_string(),
                auth_uid: uid.to_string(),
                name: name.to_string(),
                icon_url: format!("https://example.com/{uid}.png"),
            },
        );
    }

    pub fn allow_identity(&self, token: &str, identity: AuthResult) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), identity);
    }
}

#[async_trait]
impl Verifier for StaticVerifier {
    async fn verify_id_token(&self, token: &str) -> Result<AuthResult, VerifyError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| VerifyError::Rejected(format!("unknown token {token}")))
    }
}

/// Returns a canned result and records every requested URL.
pub struct StubFetcher {
    outcome: Mutex<Result<SiteMeta, u16>>,
    calls: Mutex<Vec<String>>,
}

impl Default for StubFetcher {
    fn default() -> Self {
        StubFetcher {
            outcome: Mutex::new(Ok(SiteMeta::default())),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl StubFetcher {
    pub fn respond_with(&self, title: &str, image_url: &str) {
        *self.outcome.lock().unwrap() = Ok(SiteMeta {
            title: title.to_string(),
            image_url: image_url.to_string(),
        });
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.outcome.lock().unwrap() = Err(status);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetaFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<SiteMeta, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.outcome
            .lock()
            .unwrap()
            .clone()
            .map_err(|status| FetchError::Status {
                url: url.to_string(),
                status,
            })
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub verifier: Arc<StaticVerifier>,
    pub fetcher: Arc<StubFetcher>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let verifier = Arc::new(StaticVerifier::default());
        let fetcher = Arc::new(StubFetcher::default());
        let state = AppState::new(store.clone(), verifier.clone(), fetcher.clone());
        TestContext {
            store,
            verifier,
            fetcher,
            state,
        }
    }

    /// Creates a signed-in user whose token is `tok-<name>`.
    pub async fn sign_up(&self, name: &str) -> UserRow {
        let user = self.store.seed_user(name, PROVIDER, name).await;
        self.verifier
            .allow(&format!("tok-{name}"), PROVIDER, name, name);
        user
    }

    pub fn token_for(&self, user: &UserRow) -> AuthToken {
        AuthToken(Some(format!("tok-{}", user.auth_uid)))
    }
}
