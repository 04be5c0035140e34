//! Health check for monitoring.

use crate::{app::AppState, db};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use tracing::error;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
  match db::ping(&state.db).await {
    Ok(()) => (
      StatusCode::OK,
      Json(json!({
        "status": "healthy",
        "database": "connected",
        "timestamp": Utc::now(),
      })),
    ),
    Err(e) => {
      error!("health check failed: {e}");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
          "status": "unhealthy",
          "database": "disconnected",
          "error": e.to_string(),
        })),
      )
    }
  }
}
