//! Errors surfaced by the end-to-end entry points and their HTTP mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::registry::RegistryError;
use crate::requester::RequestError;
use crate::schema::SchemaError;
use crate::validator::ValidationError;

#[derive(Debug, Error)]
pub enum QuizError {
  #[error(transparent)]
  Validation(#[from] ValidationError),
  #[error(transparent)]
  Schema(#[from] SchemaError),
  #[error(transparent)]
  Registry(#[from] RegistryError),
  #[error(transparent)]
  Request(#[from] RequestError),
}

impl IntoResponse for QuizError {
  fn into_response(self) -> axum::response::Response {
    match self {
      QuizError::Validation(e) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": e.to_string(), "fields": e.fields })),
      )
        .into_response(),
      other => {
        error!(target: "quizmaster_backend", error = %other, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" }))).into_response()
      }
    }
  }
}
