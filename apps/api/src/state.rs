use std::sync::Arc;

use crate::auth::Verifier;
use crate::metadata::MetaFetcher;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub verifier: Arc<dyn Verifier>,
    pub meta_fetcher: Arc<dyn MetaFetcher>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        verifier: Arc<dyn Verifier>,
        meta_fetcher: Arc<dyn MetaFetcher>,
    ) -> Self {
        AppState {
            store,
            verifier,
            meta_fetcher,
        }
    }
}
