//! Link previews for entry URLs.

use async_trait::async_trait;
use thiserror::Error;

pub mod http;

pub use http::HttpMetaFetcher;

/// Preview data extracted from a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteMeta {
    pub title: String,
    pub image_url: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Resolves a URL to its page title and preview image.
///
/// Carried in `AppState` as `Arc<dyn MetaFetcher>`.
#[async_trait]
pub trait MetaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<SiteMeta, FetchError>;
}
