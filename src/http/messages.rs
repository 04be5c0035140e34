//! Admin message APIs: paginated listing plus read, mark and delete.

use crate::{
  app::AppState,
  db::messages as repo,
  http::{
    contact::require_object,
    error::{ApiError, ApiResult},
  },
  models::{
    message::contact_message::ContactMessage, response::message_page::MessagePage,
  },
};
use axum::{
  Json,
  extract::{Path as AxumPath, Query, State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use tracing::info;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Raw query values; anything that does not parse as an integer falls back to its default.
#[derive(Debug, Default)]
pub struct ListParams {
  pub page: Option<String>,
  pub per_page: Option<String>,
}

impl ListParams {
  /// First occurrence of each key wins; repeated keys are not an error.
  pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
    let mut params = Self::default();
    for (key, value) in pairs {
      match key.as_str() {
        "page" if params.page.is_none() => params.page = Some(value),
        "per_page" if params.per_page.is_none() => params.per_page = Some(value),
        _ => {}
      }
    }
    params
  }
}

/// Returns `(page, per_page, offset)`.
pub fn compute_page_params(p: &ListParams) -> (i64, i64, i64) {
  let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
  let page = parse(&p.page).unwrap_or(1).max(1);
  let per_page = match parse(&p.per_page) {
    Some(n) if n >= 1 => n.min(MAX_PER_PAGE),
    _ => DEFAULT_PER_PAGE,
  };
  let offset = (page - 1).saturating_mul(per_page);
  (page, per_page, offset)
}

/// Number of pages needed for `total` rows; zero when there are none.
pub fn page_count(total: i64, per_page: i64) -> i64 {
  if total <= 0 || per_page <= 0 {
    0
  } else {
    (total + per_page - 1) / per_page
  }
}

pub async fn list_messages(
  State(state): State<AppState>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<MessagePage>> {
  const FAILED: &str = "Failed to fetch messages";
  let (page, per_page, offset) = compute_page_params(&ListParams::from_pairs(pairs));
  let total = repo::count_messages(&state.db)
    .await
    .map_err(ApiError::db(FAILED))?;
  let messages = repo::list_messages(&state.db, per_page, offset)
    .await
    .map_err(ApiError::db(FAILED))?;
  Ok(Json(MessagePage {
    messages,
    total,
    pages: page_count(total, per_page),
    current_page: page,
  }))
}

/// Ids are plain digit strings; anything else is treated like a missing row.
fn parse_id(raw: &str) -> ApiResult<i64> {
  if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
    return Err(ApiError::NotFound);
  }
  raw.parse().map_err(|_| ApiError::NotFound)
}

async fn load(state: &AppState, id: i64) -> ApiResult<ContactMessage> {
  repo::get_message(&state.db, id)
    .await
    .map_err(ApiError::db("Internal server error"))?
    .ok_or(ApiError::NotFound)
}

pub async fn get_message(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<ContactMessage>> {
  let id = parse_id(&id)?;
  Ok(Json(load(&state, id).await?))
}

pub async fn update_message(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<String>,
  body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ContactMessage>> {
  let id = parse_id(&id)?;
  let mut message = load(&state, id).await?;

  let is_read = match body {
    Ok(Json(Value::Object(map))) => match map.get("is_read") {
      None => None,
      Some(Value::Bool(b)) => Some(*b),
      Some(_) => return Err(ApiError::BadRequest("is_read must be a boolean")),
    },
    other => {
      require_object(other)?;
      None
    }
  };

  if let Some(is_read) = is_read {
    if !repo::set_read(&state.db, id, is_read)
      .await
      .map_err(ApiError::db("Internal server error"))?
    {
      return Err(ApiError::NotFound);
    }
    message.is_read = is_read;
    info!(message_id = id, is_read, "updated read flag");
  }
  Ok(Json(message))
}

pub async fn delete_message(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<Value>> {
  let id = parse_id(&id)?;
  let deleted = repo::delete_message(&state.db, id)
    .await
    .map_err(ApiError::db("Internal server error"))?;
  if !deleted {
    return Err(ApiError::NotFound);
  }
  info!(message_id = id, "deleted contact message");
  Ok(Json(json!({ "success": true, "message": "Message deleted" })))
}
