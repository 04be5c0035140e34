//! Environment-driven configuration.

use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://portfolio.db";
const DEFAULT_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_MAIL_SERVER: &str = "smtp.gmail.com";
const DEFAULT_MAIL_PORT: u16 = 587;
const DEFAULT_SENDER: &str = "noreply@yourdomain.com";
const DEFAULT_SIGNATURE: &str = "Portfolio Owner";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid POSTBOX_ADDR {value:?}: {source}")]
  InvalidAddr {
    value: String,
    #[source]
    source: AddrParseError,
  },

  #[error("invalid MAIL_PORT {0:?}: expected a number between 1 and 65535")]
  InvalidPort(String),
}

/// Outbound mail settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
  pub server: String,
  pub port: u16,
  /// STARTTLS on a plaintext connection.
  pub use_tls: bool,
  /// Implicit TLS from the first byte. Takes precedence over `use_tls`.
  pub use_ssl: bool,
  pub username: Option<String>,
  pub password: Option<String>,
  pub default_sender: String,
  pub admin_email: Option<String>,
  pub signature: String,
}

impl MailConfig {
  /// Both credentials must be present for notifications to be sent.
  pub fn is_configured(&self) -> bool {
    self.username.is_some() && self.password.is_some()
  }

  /// Where admin notifications go: `ADMIN_EMAIL`, else the SMTP username.
  pub fn admin_recipient(&self) -> Option<&str> {
    self.admin_email.as_deref().or(self.username.as_deref())
  }
}

impl Default for MailConfig {
  fn default() -> Self {
    Self {
      server: DEFAULT_MAIL_SERVER.to_string(),
      port: DEFAULT_MAIL_PORT,
      use_tls: true,
      use_ssl: false,
      username: None,
      password: None,
      default_sender: DEFAULT_SENDER.to_string(),
      admin_email: None,
      signature: DEFAULT_SIGNATURE.to_string(),
    }
  }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub addr: SocketAddr,
  /// Empty means any origin may call the API.
  pub cors_origins: Vec<String>,
  pub mail: MailConfig,
}

impl Config {
  /// Load `.env` (if any) and read the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from an arbitrary key lookup. Blank values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| {
      lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    };

    let addr_raw = get("POSTBOX_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let addr = addr_raw
      .parse::<SocketAddr>()
      .map_err(|source| ConfigError::InvalidAddr {
        value: addr_raw.clone(),
        source,
      })?;

    let port = match get("MAIL_PORT") {
      Some(raw) => raw
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or(ConfigError::InvalidPort(raw))?,
      None => DEFAULT_MAIL_PORT,
    };

    let cors_origins = get("POSTBOX_CORS_ORIGINS")
      .map(|s| {
        s.split(',')
          .map(|o| o.trim().to_string())
          .filter(|o| !o.is_empty())
          .collect()
      })
      .unwrap_or_default();

    let defaults = MailConfig::default();
    let mail = MailConfig {
      server: get("MAIL_SERVER").unwrap_or(defaults.server),
      port,
      use_tls: get("MAIL_USE_TLS").map_or(defaults.use_tls, |v| parse_flag(&v)),
      use_ssl: get("MAIL_USE_SSL").map_or(defaults.use_ssl, |v| parse_flag(&v)),
      username: get("MAIL_USERNAME"),
      password: get("MAIL_PASSWORD"),
      default_sender: get("MAIL_DEFAULT_SENDER").unwrap_or(defaults.default_sender),
      admin_email: get("ADMIN_EMAIL"),
      signature: get("MAIL_SIGNATURE").unwrap_or(defaults.signature),
    };

    Ok(Self {
      database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
      addr,
      cors_origins,
      mail,
    })
  }
}

fn parse_flag(v: &str) -> bool {
  matches!(
    v.to_ascii_lowercase().as_str(),
    "true" | "1" | "yes" | "on"
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    Config::from_lookup(|k| map.get(k).cloned())
  }

  #[test]
  fn defaults_when_environment_is_empty() {
    let cfg = load(&[]).unwrap();
    assert_eq!(cfg.database_url, "sqlite://portfolio.db");
    assert_eq!(cfg.addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
    assert!(cfg.cors_origins.is_empty());
    assert_eq!(cfg.mail, MailConfig::default());
    assert!(!cfg.mail.is_configured());
    assert_eq!(cfg.mail.admin_recipient(), None);
  }

  #[test]
  fn mail_settings_are_read() {
    let cfg = load(&[
      ("MAIL_SERVER", "mail.example.test"),
      ("MAIL_PORT", "465"),
      ("MAIL_USE_TLS", "False"),
      ("MAIL_USE_SSL", "YES"),
      ("MAIL_USERNAME", "bot@example.test"),
      ("MAIL_PASSWORD", "hunter2"),
      ("MAIL_SIGNATURE", "Ada"),
    ])
    .unwrap();
    assert_eq!(cfg.mail.server, "mail.example.test");
    assert_eq!(cfg.mail.port, 465);
    assert!(!cfg.mail.use_tls);
    assert!(cfg.mail.use_ssl);
    assert!(cfg.mail.is_configured());
    assert_eq!(cfg.mail.admin_recipient(), Some("bot@example.test"));
    assert_eq!(cfg.mail.signature, "Ada");
  }

  #[test]
  fn admin_email_overrides_username() {
    let cfg = load(&[
      ("MAIL_USERNAME", "bot@example.test"),
      ("ADMIN_EMAIL", "me@example.test"),
    ])
    .unwrap();
    assert_eq!(cfg.mail.admin_recipient(), Some("me@example.test"));
  }

  #[test]
  fn blank_credentials_count_as_missing() {
    let cfg = load(&[("MAIL_USERNAME", "  "), ("MAIL_PASSWORD", "x")]).unwrap();
    assert!(!cfg.mail.is_configured());
  }

  #[test]
  fn cors_origins_are_split_and_trimmed() {
    let cfg = load(&[(
      "POSTBOX_CORS_ORIGINS",
      "https://a.example.test, https://b.example.test,,",
    )])
    .unwrap();
    assert_eq!(
      cfg.cors_origins,
      vec!["https://a.example.test", "https://b.example.test"]
    );
  }

  #[test]
  fn bad_port_and_addr_are_rejected() {
    assert!(matches!(
      load(&[("MAIL_PORT", "smtp")]),
      Err(ConfigError::InvalidPort(_))
    ));
    assert!(matches!(
      load(&[("MAIL_PORT", "0")]),
      Err(ConfigError::InvalidPort(_))
    ));
    assert!(matches!(
      load(&[("POSTBOX_ADDR", "localhost")]),
      Err(ConfigError::InvalidAddr { .. })
    ));
  }
}
