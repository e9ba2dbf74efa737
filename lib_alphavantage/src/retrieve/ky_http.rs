//! # HTTP Retrieval Utilities
//!
//! This module provides the transport boundary used by the market clients: a
//! small `Fetch` capability (URL in, body text out) and a blocking `ApiClient`
//! that implements it on top of `reqwest`.
//!
//! The market clients only ever see `Fetch`, so tests and alternative
//! transports can stand in for the network without touching request building
//! or response validation.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

/// Request timeout used when the caller does not configure one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("lib_alphavantage/", env!("CARGO_PKG_VERSION"));

/// Errors raised by the transport. They are opaque to the market clients and
/// are passed through to callers unchanged.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Network, DNS, TLS or timeout failure while executing the request.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL with secrets masked.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status code.
    #[error("HTTP status {status} returned")]
    Status {
        /// The numeric HTTP status code.
        status: u16,
        /// The raw error body returned by the server, if it could be read.
        body: Option<String>,
    },

    /// The response body could not be read as text.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// The transport capability consumed by the market clients.
///
/// Implementations perform exactly one GET per call and never retry.
pub trait Fetch {
    /// Fetches `url` and returns the response body as text.
    fn fetch(&self, url: &Url) -> Result<String, TransportError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        (**self).fetch(url)
    }
}

/// A standardized container for raw HTTP responses.
///
/// Wraps the body text along with the status of the HTTP transaction.
#[derive(Debug)]
pub struct ApiResponse {
    /// The raw response body.
    pub body: String,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
}

/// A blocking HTTP client with a fixed request timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying `reqwest` client, reused across calls for connection pooling.
    inner: Client,
}

impl ApiClient {
    /// Creates a new `ApiClient` with the given request timeout.
    ///
    /// # Errors
    /// Returns `TransportError::Build` if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self { inner })
    }

    /// Performs a GET request and captures the response, whatever its status.
    ///
    /// Non-2xx responses are returned as `Ok` with `success == false`; only
    /// network-level failures are errors here.
    pub fn get(&self, url: &Url) -> Result<ApiResponse, TransportError> {
        let response = self
            .inner
            .get(url.clone())
            .send()
            .map_err(|source| TransportError::Request {
                url: redact_url(url),
                source,
            })?;

        let status = response.status();
        let body = response.text().map_err(TransportError::Body)?;

        Ok(ApiResponse {
            body,
            status: status.as_u16(),
            success: status.is_success(),
        })
    }
}

impl Fetch for ApiClient {
    fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        let response = self.get(url)?;

        if response.success {
            debug!(status = response.status, bytes = response.body.len(), "response received");
            Ok(response.body)
        } else {
            error!(status = response.status, url = %redact_url(url), "HTTP request failed");
            Err(TransportError::Status {
                status: response.status,
                body: Some(response.body).filter(|b| !b.is_empty()),
            })
        }
    }
}

/// Returns `url` as a string with the value of any `apikey` query parameter masked.
pub fn redact_url(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "apikey") {
        return url.to_string();
    }

    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_url_masks_only_the_api_key() {
        let url = Url::parse("https://www.alphavantage.co/query?function=SMA&symbol=IBM&apikey=SECRET").unwrap();
        let redacted = redact_url(&url);
        assert_eq!(
            redacted,
            "https://www.alphavantage.co/query?function=SMA&symbol=IBM&apikey=***"
        );
        assert!(!redacted.contains("SECRET"));
    }

    #[test]
    fn redact_url_leaves_keyless_urls_untouched() {
        let url = Url::parse("https://example.com/query?function=SMA").unwrap();
        assert_eq!(redact_url(&url), "https://example.com/query?function=SMA");
    }

    #[test]
    fn client_builds_with_a_timeout() {
        assert!(ApiClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).is_ok());
        assert!(ApiClient::new(Duration::from_millis(250)).is_ok());
    }

    #[test]
    fn status_error_reports_code() {
        let err = TransportError::Status { status: 503, body: None };
        assert_eq!(err.to_string(), "HTTP status 503 returned");
    }

    #[test]
    fn fetch_is_implemented_for_references() {
        struct Fixed;
        impl Fetch for Fixed {
            fn fetch(&self, _url: &Url) -> Result<String, TransportError> {
                Ok("{}".to_string())
            }
        }

        let fixed = Fixed;
        let by_ref: &dyn Fetch = &fixed;
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!((&by_ref).fetch(&url).unwrap(), "{}");
    }
}
