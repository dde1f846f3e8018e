//! Remote source trait and the HTTP implementation
//!
//! The orchestrators depend on the trait, not on reqwest: tests substitute
//! a scripted source to simulate transport failures and canned payloads.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value as Json;
use std::time::Duration;
use tracing::debug;

/// Default request timeout for preset and bundle fetches.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A remote JSON document source
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the document at `path`, relative to the source's base
    async fn fetch(&self, path: &str) -> Result<Json>;
}

/// HTTP remote source
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Create a source rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Json> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "fetching remote document");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Transport(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_normalizes_base_url() {
        let source = HttpSource::new("https://example.test/data/").unwrap();
        assert_eq!(source.base_url, "https://example.test/data");
    }
}
