//! # Configuration Modules
//!
//! Layered settings for the Alpha Vantage client: defaults, an optional JSON
//! file, `.env` files and the process environment.

/// Provides system-level configuration management.
pub mod config_sys;
