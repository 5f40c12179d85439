//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tally_core::{AsGradingError, ErrorKind};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A domain failure reported by the store or the score calculator.
  #[error("{message}")]
  Grading { kind: ErrorKind, message: String },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request did not identify an acting user.
  #[error("unauthenticated: {0}")]
  Unauthenticated(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the domain failure it carries, if any.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + AsGradingError + Send + Sync + 'static,
  {
    match e.as_grading_error() {
      Some(g) => ApiError::Grading { kind: g.kind(), message: g.to_string() },
      None => ApiError::Store(Box::new(e)),
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::Grading { kind, .. } => match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvariantViolation | ErrorKind::State => StatusCode::CONFLICT,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn code(&self) -> &'static str {
    match self {
      ApiError::Grading { kind, .. } => kind.as_str(),
      ApiError::NotFound(_) => ErrorKind::NotFound.as_str(),
      ApiError::BadRequest(_) => "bad_request",
      ApiError::Unauthenticated(_) => "unauthenticated",
      ApiError::Store(_) => ErrorKind::Internal.as_str(),
    }
  }
}

impl From<tally_core::Error> for ApiError {
  fn from(e: tally_core::Error) -> Self { ApiError::store(e) }
}

// ─── Extractor rejections ─────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let body = json!({ "error": self.code(), "message": self.to_string() });
    (status, Json(body)).into_response()
  }
}
