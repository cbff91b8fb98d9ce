//! source::http
//!
//! Snapshots served from an HTTP directory index.
//!
//! # Layout
//!
//! The archive is expected to publish one index page per target:
//!
//! ```text
//! <base_url><target>/              HTML page linking to each tarball
//! <base_url><target>/<file>        the tarball itself
//! ```
//!
//! The index is scraped for `<a href=...>` values; nothing else in the page
//! is interpreted.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};

use super::normalize_listing;
use super::traits::{SnapshotSource, SourceError};
use crate::core::version::VersionFilename;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
        .expect("href pattern is a valid regex")
});

/// Extract every anchor `href` value from an HTML page, in document order.
///
/// `&amp;` is decoded; other entities and percent-escapes are left alone.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .collect()
}

/// HTTP directory-index source.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    /// Create a source rooted at `base_url`. A trailing `/` is added if missing.
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("tarball-history/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    /// The index page URL for a target.
    pub fn index_url(&self, target: &str) -> String {
        format!("{}{}/", self.base_url, target)
    }

    /// The download URL for one snapshot.
    pub fn file_url(&self, target: &str, file: &VersionFilename) -> String {
        format!("{}{}/{}", self.base_url, target, file)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list(&self, target: &str) -> Result<Vec<VersionFilename>, SourceError> {
        let url = self.index_url(target);
        let page = self
            .get(&url)
            .await?
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(normalize_listing(extract_hrefs(&page)))
    }

    async fn fetch(&self, target: &str, file: &VersionFilename) -> Result<Vec<u8>, SourceError> {
        let url = self.file_url(target, file);
        let bytes = self
            .get(&url)
            .await?
            .bytes()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
