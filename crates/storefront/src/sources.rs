//! Remote fetch layer for the upstream demo catalog APIs.
//!
//! Every request is bounded by a timeout and the pending request is dropped
//! when it expires. Successful payloads are cached using `moka` so that a
//! catalog reset followed by a reload does not hit upstream again within the
//! TTL. Failures are never cached and never retried here; the catalog
//! pipeline decides what to do with them.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use bmart_core::ApiSource;

/// Errors that can occur when fetching from an upstream source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request did not complete in time.
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One upstream catalog provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSource {
    pub source: ApiSource,
    pub products_url: Url,
    pub categories_url: Url,
}

impl UpstreamSource {
    /// FakeStore endpoints relative to `base` (e.g. `https://fakestoreapi.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint paths cannot be joined onto `base`.
    pub fn fakestore(base: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            source: ApiSource::FakeStore,
            products_url: base.join("products")?,
            categories_url: base.join("products/categories")?,
        })
    }

    /// DummyJSON endpoints relative to `base` (e.g. `https://dummyjson.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint paths cannot be joined onto `base`.
    pub fn dummyjson(base: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            source: ApiSource::DummyJson,
            products_url: base.join("products?limit=100")?,
            categories_url: base.join("products/categories")?,
        })
    }
}

// =============================================================================
// SourceClient
// =============================================================================

/// HTTP client for upstream JSON endpoints.
///
/// Cheap to clone; clones share the connection pool and the response cache.
#[derive(Clone)]
pub struct SourceClient {
    inner: Arc<SourceClientInner>,
}

struct SourceClientInner {
    client: reqwest::Client,
    cache: Cache<String, Arc<Value>>,
}

impl SourceClient {
    /// Create a client whose successful responses live for `cache_ttl`.
    #[must_use]
    pub fn new(cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(SourceClientInner {
                client: reqwest::Client::new(),
                cache,
            }),
        }
    }

    /// GET `url` and parse the body as JSON, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Timeout`] if the deadline passes,
    /// [`SourceError::Status`] for non-2xx responses, and
    /// [`SourceError::Network`] or [`SourceError::Parse`] otherwise.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_json(&self, url: &Url, timeout: Duration) -> Result<Value, SourceError> {
        if let Some(value) = self.inner.cache.get(url.as_str()).await {
            debug!("Cache hit for upstream payload");
            return Ok(Value::clone(&value));
        }

        let value = tokio::time::timeout(timeout, self.fetch_uncached(url))
            .await
            .map_err(|_| SourceError::Timeout {
                url: url.to_string(),
                after: timeout,
            })??;

        self.inner
            .cache
            .insert(url.to_string(), Arc::new(value.clone()))
            .await;

        Ok(value)
    }

    async fn fetch_uncached(&self, url: &Url) -> Result<Value, SourceError> {
        let response = self
            .inner
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body = %body.chars().take(200).collect::<String>(),
                "Upstream returned invalid JSON"
            );
            SourceError::Parse(e)
        })
    }

    /// Drop every cached payload.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
