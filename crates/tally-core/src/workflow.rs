//! The grading state machine.
//!
//! ```text
//!  create ──► pending ──begin──► grading
//!               │                  │
//!               └──── finalize ────┴──► graded
//!
//!  create ──► auto_graded          (objective-only quizzes)
//! ```
//!
//! `graded` and `auto_graded` are terminal. There is no regrade or give-back
//! transition.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingStatus {
  /// Awaiting an instructor.
  Pending,
  /// An instructor has opened it and may be entering scores.
  Grading,
  /// Manual grading finalized.
  Graded,
  /// Resolved by objective scoring alone; set only at creation.
  AutoGraded,
}

/// An action that moves a submission between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// An instructor opens the submission for review.
  Begin,
  /// A manual or rubric grade is recorded.
  Finalize,
}

impl Transition {
  fn as_str(self) -> &'static str {
    match self {
      Self::Begin => "begin grading",
      Self::Finalize => "finalize",
    }
  }
}

impl GradingStatus {
  pub const ALL: [GradingStatus; 4] =
    [Self::Pending, Self::Grading, Self::Graded, Self::AutoGraded];

  /// Status of a freshly recorded submission.
  pub fn initial(requires_manual_grading: bool) -> Self {
    if requires_manual_grading { Self::Pending } else { Self::AutoGraded }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Graded | Self::AutoGraded)
  }

  /// Counts toward an instructor's queue.
  pub fn is_awaiting_grading(self) -> bool {
    matches!(self, Self::Pending | Self::Grading)
  }

  /// The transition table. Returns the target status, or `None` if the
  /// transition is not defined from `self`.
  pub fn next(self, transition: Transition) -> Option<Self> {
    match (self, transition) {
      (Self::Pending, Transition::Begin) => Some(Self::Grading),
      (Self::Pending | Self::Grading, Transition::Finalize) => {
        Some(Self::Graded)
      }
      (Self::Grading, Transition::Begin) => None,
      (Self::Graded | Self::AutoGraded, _) => None,
    }
  }

  /// Like [`next`](Self::next), but reports an illegal move as
  /// [`Error::State`].
  pub fn apply(self, transition: Transition) -> Result<Self> {
    self.next(transition).ok_or_else(|| {
      Error::State(format!(
        "cannot {} a submission that is {}",
        transition.as_str(),
        self.as_str()
      ))
    })
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Grading => "grading",
      Self::Graded => "graded",
      Self::AutoGraded => "auto_graded",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|st| st.as_str() == s)
  }
}
