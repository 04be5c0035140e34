//! API descriptor served at `/`.

use axum::Json;
use serde_json::{Value, json};

pub async fn api_index() -> Json<Value> {
  Json(json!({
    "message": "Portfolio Backend API",
    "version": env!("CARGO_PKG_VERSION"),
    "endpoints": {
      "/api/contact": "POST - Submit contact form",
      "/api/messages": "GET - Get all messages (admin)",
      "/api/messages/<id>": "GET, PUT, DELETE - Manage specific message",
      "/health": "GET - Health check",
    }
  }))
}
