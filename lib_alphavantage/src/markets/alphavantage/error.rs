//! Error taxonomy for the Alpha Vantage client.

use thiserror::Error;

use crate::retrieve::ky_http::TransportError;

/// Every way an Alpha Vantage call can fail.
///
/// All errors are terminal for the call that produced it: nothing is retried
/// and there are no partial results.
#[derive(Debug, Error)]
pub enum AlphaVantageError {
    /// The client was constructed without an API key.
    #[error("missing API key, get a free key from the Alpha Vantage website")]
    MissingCredential,

    /// A parameter value could not be serialized for the provider.
    #[error("invalid value {value:?} for parameter `{field}`: {reason}")]
    InvalidParameter {
        /// The offending parameter name.
        field: String,
        /// The value as supplied by the caller.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The provider returned no body at all.
    #[error("no data returned, check symbol or parameters")]
    EmptyResponse,

    /// The provider rejected the request and said why.
    #[error("provider error: {0}")]
    Provider(String),

    /// The body is valid JSON but an expected top-level key is missing.
    #[error("malformed response: expected key {missing_key:?} not found{}", notice_suffix(.notice))]
    MalformedResponse {
        /// The data or meta-data key that was expected.
        missing_key: String,
        /// A "Note" or "Information" message found in the body instead, if any.
        notice: Option<String>,
    },

    /// The body is not valid JSON.
    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The transport failed; passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AlphaVantageError {
    /// Shorthand for building an `InvalidParameter` error.
    pub(crate) fn invalid(field: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True for both flavours of malformed response (missing key or bad JSON).
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. } | Self::MalformedBody(_))
    }
}

fn notice_suffix(notice: &Option<String>) -> String {
    notice
        .as_ref()
        .map(|n| format!(" (provider notice: {n})"))
        .unwrap_or_default()
}

/// Result type for Alpha Vantage operations.
pub type Result<T> = std::result::Result<T, AlphaVantageError>;
