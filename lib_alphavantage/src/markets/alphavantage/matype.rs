//! Moving-average type codes.
//!
//! The provider identifies the moving average used inside composite indicators
//! (MACDEXT, STOCH, BBANDS) by a numeric code. The code is the index of the
//! name in `MA_TYPES`; that ordering is the provider's contract and must not
//! change.

use super::error::{AlphaVantageError, Result};

/// Moving-average names, indexed by provider code.
pub const MA_TYPES: [&str; 9] = ["SMA", "EMA", "WMA", "DEMA", "TEMA", "TRIMA", "T3", "KAMA", "MAMA"];

/// Returns the numeric code for a moving-average name (case-sensitive).
pub fn code_of(name: &str) -> Option<usize> {
    MA_TYPES.iter().position(|&t| t == name)
}

/// Resolves a caller-supplied moving-average value into the token sent on the wire.
///
/// Anything that parses as an integer is passed through exactly as written;
/// otherwise the value must match one of `MA_TYPES` exactly and is replaced by
/// its index.
pub fn resolve(field: &str, value: &str) -> Result<String> {
    if value.parse::<i64>().is_ok() {
        return Ok(value.to_string());
    }

    code_of(value).map(|code| code.to_string()).ok_or_else(|| {
        AlphaVantageError::invalid(
            field,
            value,
            format!("expected an integer code or one of {}", MA_TYPES.join(", ")),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_their_index() {
        for (i, name) in MA_TYPES.iter().enumerate() {
            assert_eq!(code_of(name), Some(i));
        }
        assert_eq!(code_of("MACD"), None);
    }

    #[test]
    fn resolve_translates_names() {
        assert_eq!(resolve("fastmatype", "EMA").unwrap(), "1");
        assert_eq!(resolve("fastmatype", "KAMA").unwrap(), "7");
        assert_eq!(resolve("signalmatype", "MAMA").unwrap(), "8");
    }

    #[test]
    fn resolve_passes_integers_through() {
        assert_eq!(resolve("slowmatype", "4").unwrap(), "4");
        assert_eq!(resolve("slowmatype", "0").unwrap(), "0");
    }

    #[test]
    fn resolve_keeps_integer_text_verbatim() {
        assert_eq!(resolve("slowmatype", "04").unwrap(), "04");
        assert_eq!(resolve("slowmatype", "+4").unwrap(), "+4");
        assert!(resolve("slowmatype", " 4 ").is_err());
    }

    #[test]
    fn resolve_is_case_sensitive() {
        assert!(resolve("fastmatype", "ema").is_err());
    }

    #[test]
    fn resolve_requires_an_exact_name() {
        assert!(resolve("fastmatype", " EMA").is_err());
        assert!(resolve("fastmatype", "EMA ").is_err());
    }

    #[test]
    fn resolve_rejects_unknown_tokens() {
        match resolve("fastmatype", "bogus") {
            Err(AlphaVantageError::InvalidParameter { field, value, .. }) => {
                assert_eq!(field, "fastmatype");
                assert_eq!(value, "bogus");
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }
}
