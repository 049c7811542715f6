//! HTTP Quote Fetcher
//!
//! Issues one request per tracked symbol against the quote API
//! (`GET {base}?symbol={S}&token={KEY}`) and normalizes the response into a
//! [`QuoteRecord`]. Every failure here is per-symbol: the caller logs it and
//! moves on to the next symbol in the cycle.

use reqwest::Client;

use crate::config::ApiToken;
use crate::record::QuoteRecord;

/// Per-symbol fetch error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network failure or non-2xx response status.
    #[error("quote request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response body was valid JSON but not an object.
    #[error("quote response for {symbol} is not a JSON object")]
    NotAnObject {
        /// Symbol whose response was malformed.
        symbol: String,
    },
}

/// HTTP client for the quote API.
#[derive(Debug, Clone)]
pub struct QuoteFetcher {
    http: Client,
    base_url: String,
    token: ApiToken,
}

impl QuoteFetcher {
    /// Create a fetcher for the given API base URL and credential.
    #[must_use]
    pub fn new(base_url: String, token: ApiToken) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token,
        }
    }

    /// Fetch the current quote snapshot for one symbol.
    ///
    /// On success the returned record carries the upstream fields plus the
    /// injected `symbol` and `fetched_at` (assigned here, at fetch time).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, non-2xx status, or a body that
    /// is not a JSON object. Failures are isolated to this symbol.
    pub async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("symbol", symbol), ("token", self.token.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        let fetched_at = chrono::Utc::now().timestamp();

        QuoteRecord::from_upstream(body, symbol, fetched_at).ok_or_else(|| {
            FetchError::NotAnObject {
                symbol: symbol.to_string(),
            }
        })
    }
}
