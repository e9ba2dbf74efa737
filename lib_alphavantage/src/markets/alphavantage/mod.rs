//! # Alpha Vantage Market Data Client
//!
//! Maps one call per supported function onto a single GET request against the
//! Alpha Vantage query API, and returns the JSON payload split into its data
//! section and its `Meta Data` envelope.
//!
//! ## Contained Modules:
//!
//! - **`catalog`**: the static table of supported functions, their parameters
//!   and the response keys to extract.
//! - **`query`**: the request builder. Unset parameters are omitted, the API
//!   key always comes last.
//! - **`response`**: the validator that turns a decoded body into
//!   `(data, meta_data)` or a precise error.
//! - **`matype`**: moving-average names and their numeric codes.
//! - **`apicall`**: the `AlphaVantage` client tying them to a transport.
//! - **`error`**: the error taxonomy shared by all of the above.
//!
//! ## Example:
//!
//! ```no_run
//! use lib_alphavantage::markets::alphavantage::{AlphaVantage, QueryParams};
//!
//! let av = AlphaVantage::new(std::env::var("ALPHAVANTAGE_API_KEY").ok())?;
//! let params = QueryParams::new().set("fastmatype", "KAMA");
//! let (data, meta) = av.get_macdext("IBM", &params)?;
//! println!("{} -> {} points", meta["2: Symbol"], data.as_object().map_or(0, |m| m.len()));
//! # Ok::<(), lib_alphavantage::markets::alphavantage::AlphaVantageError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The `AlphaVantage` client and its per-function methods.
pub mod apicall;
/// Supported functions, their parameters and response keys.
pub mod catalog;
/// Errors raised while building requests or reading responses.
pub mod error;
/// Moving-average type names and codes.
pub mod matype;
/// Request builder.
pub mod query;
/// Response validator and unpacker.
pub mod response;

pub use apicall::{AlphaVantage, Series, ALPHA_VANTAGE_API_URL};
pub use catalog::{DataKey, Function, IndicatorSpec, ParamKind, ParamSpec, CATALOG, META_DATA_KEY};
pub use error::{AlphaVantageError, Result};
pub use query::{build_query, ParamValue, Query, QueryParams};
pub use response::{decode_body, unpack};
