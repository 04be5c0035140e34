//! JSON error responses.

use crate::validation::FieldErrors;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Not found")]
  NotFound,

  #[error("{0}")]
  BadRequest(&'static str),

  #[error("validation failed")]
  Validation(FieldErrors),

  /// `public` is what the client sees; `source` is only logged.
  #[error("{public}")]
  Database {
    public: &'static str,
    #[source]
    source: sqlx::Error,
  },
}

impl ApiError {
  /// Adapter for `map_err` that tags a database failure with its client-facing message.
  pub fn db(public: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |source| ApiError::Database { public, source }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
      }
      ApiError::BadRequest(msg) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
      }
      ApiError::Validation(errors) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
      }
      ApiError::Database { public, source } => {
        error!("{public}: {source}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": public })),
        )
          .into_response()
      }
    }
  }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> ApiError {
  ApiError::NotFound
}
