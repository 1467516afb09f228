use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::{bytes, Regex};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use tracing::debug;

use crate::metadata::{FetchError, MetaFetcher, SiteMeta};

const USER_AGENT: &str = concat!("adventar-bot/", env!("CARGO_PKG_VERSION"));

/// Preview tags live in `<head>`; nothing past this is read.
const MAX_BODY_BYTES: usize = 1024 * 1024;

static HEAD_END: Lazy<bytes::Regex> =
    Lazy::new(|| bytes::Regex::new(r"(?i)</head\s*>").expect("HEAD_END should compile"));
static META_CHARSET: Lazy<bytes::Regex> = Lazy::new(|| {
    bytes::Regex::new(r#"(?i-u)<meta\b[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:-]+)"#)
        .expect("META_CHARSET should compile")
});

static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("META_TAG should compile"));
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([a-zA-Z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("ATTRIBUTE should compile")
});
static TITLE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("TITLE_TAG should compile")
});

/// Fetches a page over HTTP(S) and reads its OpenGraph tags, falling back
/// to `<title>` when the page has no `og:title`.
#[derive(Clone)]
pub struct HttpMetaFetcher {
    client: Client,
}

impl HttpMetaFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()?,
        })
    }
}

#[async_trait]
impl MetaFetcher for HttpMetaFetcher {
    async fn fetch(&self, url: &str) -> Result<SiteMeta, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Redirects change the base for relative image paths.
        let base = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = read_head(response).await?;
        let html = decode_html(&body, content_type.as_deref());
        let meta = parse_site_meta(&html, &base);
        debug!("Fetched metadata for {url}: {meta:?}");
        Ok(meta)
    }
}

/// Reads the body until `</head>` shows up or `MAX_BODY_BYTES` is reached.
async fn read_head(mut response: Response) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        // The closing tag may straddle two chunks.
        let scan_from = body.len().saturating_sub(16);
        let take = chunk.len().min(MAX_BODY_BYTES - body.len());
        body.extend_from_slice(&chunk[..take]);
        if body.len() >= MAX_BODY_BYTES || HEAD_END.is_match(&body[scan_from..]) {
            break;
        }
    }
    Ok(body)
}

/// Decodes with the `Content-Type` charset, then a `<meta>` declaration,
/// then UTF-8. A byte order mark overrides all of them.
fn decode_html(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| {
            META_CHARSET
                .captures(body)
                .and_then(|c| c.get(1))
                .and_then(|m| Encoding::for_label(m.as_bytes()))
                .map(Encoding::output_encoding)
        })
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Extracts preview data from an HTML document.
pub fn parse_site_meta(html: &str, base: &Url) -> SiteMeta {
    let tags = meta_tags(html);

    let title = tags
        .get("og:title")
        .cloned()
        .or_else(|| {
            TITLE_TAG
                .captures(html)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
        .map(|t| collapse_whitespace(&decode_entities(&t)))
        .unwrap_or_default();

    let image_url = tags
        .get("og:image")
        .or_else(|| tags.get("twitter:image"))
        .map(|raw| {
            let raw = decode_entities(raw.trim());
            base.join(&raw).map(|u| u.to_string()).unwrap_or(raw)
        })
        .unwrap_or_default();

    SiteMeta { title, image_url }
}

/// `property`/`name` → `content` for every `<meta>` tag; the first occurrence wins.
fn meta_tags(html: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for tag in META_TAG.find_iter(html) {
        let attrs: HashMap<String, String> = ATTRIBUTE
            .captures_iter(tag.as_str())
            .filter_map(|c| {
                let key = c.get(1)?.as_str().to_ascii_lowercase();
                let value = c.get(2).or_else(|| c.get(3))?.as_str().to_string();
                Some((key, value))
            })
            .collect();

        let key = attrs.get("property").or_else(|| attrs.get("name"));
        if let (Some(key), Some(content)) = (key, attrs.get("content")) {
            tags.entry(key.to_ascii_lowercase())
                .or_insert_with(|| content.clone());
        }
    }
    tags
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
