//! HTTP router and handlers.

use crate::app::AppState;
use axum::{
  Router,
  http::HeaderValue,
  routing::{get, post},
};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::warn;

pub mod contact;
pub mod error;
pub mod health;
pub mod index;
pub mod messages;

/// Any origin when `origins` is empty, otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
  if origins.is_empty() {
    return CorsLayer::permissive();
  }
  let allowed: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|o| match o.parse() {
      Ok(v) => Some(v),
      Err(_) => {
        warn!("ignoring invalid CORS origin {o:?}");
        None
      }
    })
    .collect();
  CorsLayer::new()
    .allow_origin(allowed)
    .allow_methods(Any)
    .allow_headers(Any)
}

/// Assemble the HTTP router with all routes.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
  Router::new()
    .route("/", get(index::api_index))
    .route("/api/contact", post(contact::submit_contact))
    .route("/api/messages", get(messages::list_messages))
    .route(
      "/api/messages/:id",
      get(messages::get_message)
        .put(messages::update_message)
        .delete(messages::delete_message),
    )
    .route("/health", get(health::health_check))
    .fallback(error::not_found)
    .layer(cors_layer(cors_origins))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
