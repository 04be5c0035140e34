//! Application setup and runtime.

pub mod config;

use crate::{db, http, notify::Notifier};
use config::Config;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::{info, warn};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
  pub db: SqlitePool,
  pub notifier: Notifier,
}

/// Load configuration, prepare the database and serve HTTP until the process is stopped.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  crate::util::init_tracing();

  let config = Config::from_env()?;

  let db_url = db::ensure_sqlite_path(&config.database_url);
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;
  db::run_migrations(&pool).await?;

  let notifier = Notifier::from_config(&config.mail)?;
  if notifier.is_enabled() {
    info!(
      server = %config.mail.server,
      port = config.mail.port,
      "email notifications enabled"
    );
  } else {
    warn!("MAIL_USERNAME/MAIL_PASSWORD not set: email notifications are disabled");
  }

  let state = AppState { db: pool, notifier };
  let app = http::build_router(state, &config.cors_origins);

  info!("contact endpoint:     POST http://{}/api/contact", config.addr);
  info!("admin listing:        GET  http://{}/api/messages", config.addr);
  info!("health check:         GET  http://{}/health", config.addr);

  let listener = tokio::net::TcpListener::bind(config.addr).await?;
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      warn!("failed to listen for ctrl-c: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        warn!("failed to listen for SIGTERM: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => info!("received ctrl-c, shutting down"),
    _ = terminate => info!("received SIGTERM, shutting down"),
  }
}
