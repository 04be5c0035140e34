//! Contact form submission.

use crate::{
  app::AppState,
  db::messages::insert_message,
  http::error::{ApiError, ApiResult},
  models::message::contact_form::ContactForm,
  validation::validate_contact,
};
use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct ContactResponse {
  pub success: bool,
  pub message: &'static str,
  pub id: i64,
}

/// Body must be a non-empty JSON object.
pub(crate) fn require_object(
  body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<serde_json::Map<String, Value>> {
  match body {
    Ok(Json(Value::Object(map))) if !map.is_empty() => Ok(map),
    Ok(_) => Err(ApiError::BadRequest("No data provided")),
    Err(rejection) => {
      debug!("rejected request body: {rejection}");
      Err(ApiError::BadRequest("No data provided"))
    }
  }
}

pub async fn submit_contact(
  State(state): State<AppState>,
  body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
  let map = require_object(body)?;
  let form: ContactForm = serde_json::from_value(Value::Object(map))
    .map_err(|_| ApiError::BadRequest("Invalid data format"))?;
  let new_msg = validate_contact(&form).map_err(ApiError::Validation)?;

  let stored = insert_message(&state.db, &new_msg, Utc::now())
    .await
    .map_err(ApiError::db(
      "An internal error occurred. Please try again later.",
    ))?;
  info!(message_id = stored.id, "stored contact message");

  state.notifier.notify(&stored).await;

  Ok((
    StatusCode::CREATED,
    Json(ContactResponse {
      success: true,
      message: "Your message has been sent successfully!",
      id: stored.id,
    }),
  ))
}
