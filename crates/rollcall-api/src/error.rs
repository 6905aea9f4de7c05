//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! The interesting part is the [`From<rollcall_core::Error>`] impl: the
//! domain taxonomy maps onto HTTP statuses in exactly one place, so
//! handlers can use `?` and stay thin.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rollcall_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("internal error")]
  Internal,
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::OfferingNotFound(_) | CoreError::EnrollmentNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      CoreError::CapacityExceeded { .. }
      | CoreError::AlreadyEnrolled { .. }
      | CoreError::OfferingInUse(_) => ApiError::Conflict(e.to_string()),
      CoreError::RejectionLimitExceeded(_) | CoreError::InvalidTransition { .. } => {
        ApiError::Unprocessable(e.to_string())
      }
      CoreError::Forbidden(reason) => ApiError::Forbidden(reason.to_string()),
      CoreError::Storage(inner) => {
        // Storage details stay out of responses.
        tracing::error!(error = %inner, "storage failure");
        ApiError::Internal
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Internal => {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
