//! Aggregate grading statistics. Derived on demand, never stored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::score::round_half_up;

/// Which submissions a [`GradingStats`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum GradingScope {
  Organization(Uuid),
  Instructor(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GradingStats {
  pub total_attempts:  u64,
  /// `pending` or `grading`.
  pub pending_grading: u64,
  /// `graded` or `auto_graded`.
  pub graded:          u64,
  /// Mean of `manual_score ?? automatic_score` over scored submissions,
  /// rounded; `0` when nothing is scored.
  pub avg_score:       u32,
}

impl GradingStats {
  /// Assemble from raw counts and the unrounded mean (`None` when no
  /// submission carries a score).
  pub fn from_parts(
    total_attempts: u64,
    pending_grading: u64,
    graded: u64,
    mean_score: Option<f64>,
  ) -> Self {
    Self {
      total_attempts,
      pending_grading,
      graded,
      avg_score: mean_score.map(|m| round_half_up(m) as u32).unwrap_or(0),
    }
  }
}
