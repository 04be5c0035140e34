//! Utility functions: tracing and HTML escaping.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize pretty CLI logging. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .pretty()
    .init();
}

/// HTML escaping for user text placed in element bodies or quoted attributes.
pub fn html_escape(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
    .replace('\'', "&#39;")
}
