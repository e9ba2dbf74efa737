//! # Response Validator
//!
//! Splits a decoded provider response into its data and metadata sections,
//! or explains precisely why it cannot.
//!
//! Checks run in a fixed order: empty body, provider-reported error, missing
//! data key, missing metadata key. The two sections are returned untouched;
//! interpreting the time series is left to the caller.

use serde_json::{Map, Value};

use super::error::{AlphaVantageError, Result};

/// Top-level key the provider uses to reject a request.
pub const ERROR_MESSAGE_KEY: &str = "Error Message";

/// Keys under which the provider explains throttling or usage limits.
const NOTICE_KEYS: [&str; 2] = ["Note", "Information"];

/// Decodes a raw response body.
///
/// A blank body is `EmptyResponse`; anything that is not JSON is `MalformedBody`.
pub fn decode_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Err(AlphaVantageError::EmptyResponse);
    }
    Ok(serde_json::from_str(body)?)
}

/// Returns `(data, meta_data)` from a decoded response.
pub fn unpack(response: Value, data_key: &str, meta_key: &str) -> Result<(Value, Value)> {
    if is_empty(&response) {
        return Err(AlphaVantageError::EmptyResponse);
    }

    let mut object = match response {
        Value::Object(map) => map,
        _ => {
            return Err(AlphaVantageError::MalformedResponse {
                missing_key: data_key.to_string(),
                notice: None,
            })
        }
    };

    if let Some(message) = object.get(ERROR_MESSAGE_KEY) {
        let message = match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(AlphaVantageError::Provider(message));
    }

    for key in [data_key, meta_key] {
        if !object.contains_key(key) {
            return Err(AlphaVantageError::MalformedResponse {
                missing_key: key.to_string(),
                notice: notice(&object),
            });
        }
    }

    match (object.remove(data_key), object.remove(meta_key)) {
        (Some(data), Some(meta)) => Ok((data, meta)),
        _ => Err(AlphaVantageError::MalformedResponse {
            missing_key: data_key.to_string(),
            notice: None,
        }),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn notice(object: &Map<String, Value>) -> Option<String> {
    NOTICE_KEYS
        .iter()
        .find_map(|k| object.get(*k))
        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
}
