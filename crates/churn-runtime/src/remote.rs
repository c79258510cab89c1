//! HTTP fetch of the published sheet export.

use std::time::Duration;

use churn_core::{ChurnError, Result};
use reqwest::Client;
use tracing::debug;

/// A configured remote export URL.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Client,
    url: String,
}

impl RemoteSource {
    /// Build a source for `url`. Without `timeout` the transport defaults apply.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ChurnError::RemoteFetch(format!("building HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// GET the URL and return its body.
    ///
    /// Transport errors, non-success statuses and empty bodies are all
    /// reported as [`ChurnError::RemoteFetch`].
    pub async fn fetch(&self) -> Result<String> {
        debug!("Fetching remote source {}", self.url);
        let text = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ChurnError::RemoteFetch(format!("GET {} failed: {}", self.url, e)))?
            .error_for_status()
            .map_err(|e| ChurnError::RemoteFetch(format!("non-success status: {}", e)))?
            .text()
            .await
            .map_err(|e| ChurnError::RemoteFetch(format!("reading body: {}", e)))?;

        if text.is_empty() {
            return Err(ChurnError::RemoteFetch(format!(
                "{} returned an empty body",
                self.url
            )));
        }
        Ok(text)
    }
}

// ── Test server ───────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::test_server::{serve_once, unreachable_url};
    use super::*;

    #[tokio::test]
    async fn test_fetch_success() {
        let url = serve_once("200 OK", "banner\nheader\n").await;
        let source = RemoteSource::new(url, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(source.fetch().await.unwrap(), "banner\nheader\n");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let url = serve_once("500 Internal Server Error", "oops").await;
        let source = RemoteSource::new(url, Some(Duration::from_secs(5))).unwrap();
        assert!(matches!(
            source.fetch().await,
            Err(ChurnError::RemoteFetch(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_empty_body() {
        let url = serve_once("200 OK", "").await;
        let source = RemoteSource::new(url, None).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("empty body"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let source = RemoteSource::new(unreachable_url().await, Some(Duration::from_secs(5))).unwrap();
        assert!(source.fetch().await.is_err());
    }
}
