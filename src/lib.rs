//! postbox library entrypoint.
//!
//! Modules:
//! - `app`: startup, configuration, shared state
//! - `http`: Axum router and handlers
//! - `notify`: outbound notification emails (lettre)
//! - `db`: migrations and SQLite queries
//! - `models`: typed records used across layers
//! - `validation`: contact form checks
//! - `util`: tracing setup and HTML escaping

pub mod app;
pub mod db;
pub mod http;
pub mod models;
pub mod notify;
pub mod util;
pub mod validation;
