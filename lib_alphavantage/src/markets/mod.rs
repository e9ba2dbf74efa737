//! # Financial Market APIs Module
//!
//! This module groups together the client implementations for external market
//! data providers. Each provider lives in its own sub-module and talks to the
//! network only through the `retrieve` transport layer.
//!
//! ## Contained Modules:
//!
//! - **`alphavantage`**: catalog-driven client for the Alpha Vantage query API,
//!   covering time series and technical indicators.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Client for the Alpha Vantage time series and technical indicator API.
pub mod alphavantage;
