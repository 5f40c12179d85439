//! Error types for `tally-core`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The failure categories every grading operation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  NotFound,
  InvariantViolation,
  State,
  Authorization,
  /// A backend failure outside the domain, such as storage I/O.
  Internal,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Validation => "validation_error",
      Self::NotFound => "not_found",
      Self::InvariantViolation => "invariant_violation",
      Self::State => "state_error",
      Self::Authorization => "authorization_error",
      Self::Internal => "internal_error",
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input: non-positive `max_points`, out-of-range scores, a
  /// rubric with no points to grade against.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: uuid::Uuid },

  /// The operation would break the single-default-rubric invariant.
  #[error("invariant violation: {0}")]
  InvariantViolation(String),

  /// The grading transition is not legal from the current status.
  #[error("state error: {0}")]
  State(String),

  #[error("not authorized: {0}")]
  Authorization(String),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn rubric_not_found(id: uuid::Uuid) -> Self {
    Self::NotFound { entity: "rubric", id }
  }

  pub fn submission_not_found(id: uuid::Uuid) -> Self {
    Self::NotFound { entity: "submission", id }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
      Self::State(_) => ErrorKind::State,
      Self::Authorization(_) => ErrorKind::Authorization,
    }
  }
}

/// Lets outer layers recover the domain failure carried by a backend error.
///
/// Storage backends wrap [`Error`] alongside their own I/O failures; the HTTP
/// layer needs the domain kind to pick a status code.
pub trait AsGradingError {
  fn as_grading_error(&self) -> Option<&Error>;
}

impl AsGradingError for Error {
  fn as_grading_error(&self) -> Option<&Error> { Some(self) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
