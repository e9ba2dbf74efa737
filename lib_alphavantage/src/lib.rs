//! # lib_alphavantage
//!
//! A client for the Alpha Vantage market data API. Each area lives in its own
//! folder behind a cargo feature of the same name; `full` (the default) turns
//! them all on.
//!
//! - **`markets`**: the indicator catalog, request builder, response unpacker and client.
//! - **`retrieve`**: the HTTP transport.
//! - **`configs`**: layered configuration.
//! - **`loggers`**: `tracing` subscriber setup.

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "markets")]
pub mod markets;
#[cfg(feature = "retrieve")]
pub mod retrieve;

#[cfg(feature = "markets")]
pub use markets::alphavantage::{AlphaVantage, AlphaVantageError, Function, QueryParams};
