//! # Data Retrieval Module
//!
//! This module provides the transport layer shared by the market clients.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: The `Fetch` capability, its `TransportError`, and a blocking
//!   `ApiClient` built on `reqwest`. Requests are never retried.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Blocking HTTP transport behind the `Fetch` trait.
pub mod ky_http;
