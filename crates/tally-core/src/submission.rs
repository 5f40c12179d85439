//! Submission: the grading-relevant slice of a learner's attempt.
//!
//! Submissions are created by the external quiz flow. Tally owns only the
//! grading fields; question content and learner identity live elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, workflow::GradingStatus};

/// Points awarded on one rubric criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
  pub criterion_index: usize,
  pub awarded_points:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
  pub submission_id:    Uuid,
  pub organization_id:  Uuid,
  /// The instructor who owns grading for this submission.
  pub instructor_id:    Uuid,
  pub rubric_id:        Option<Uuid>,
  /// Percentage produced by objective scoring upstream.
  pub automatic_score:  Option<f64>,
  pub manual_score:     Option<f64>,
  /// Present only when a rubric was used.
  pub criterion_scores: Option<Vec<CriterionScore>>,
  pub grading_status:   GradingStatus,
  pub completed_at:     DateTime<Utc>,
  pub graded_at:        Option<DateTime<Utc>>,
}

impl Submission {
  /// The score reported for this submission: manual grading wins over the
  /// automatic score.
  pub fn effective_score(&self) -> Option<f64> {
    self.manual_score.or(self.automatic_score)
  }
}

/// Input to [`crate::store::GradingStore::record_submission`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubmission {
  pub organization_id:         Uuid,
  pub instructor_id:           Uuid,
  #[serde(default)]
  pub automatic_score:         Option<f64>,
  /// `false` for quizzes with no free-response component; those are fully
  /// resolved by objective scoring and start out `auto_graded`.
  #[serde(default = "default_true")]
  pub requires_manual_grading: bool,
  /// Defaults to the time of recording.
  #[serde(default)]
  pub completed_at:            Option<DateTime<Utc>>,
}

fn default_true() -> bool { true }

impl NewSubmission {
  /// Validate and build the stored submission with its initial status.
  pub fn into_submission(self, now: DateTime<Utc>) -> Result<Submission> {
    if let Some(score) = self.automatic_score {
      check_score(score)?;
    }
    let status = GradingStatus::initial(self.requires_manual_grading);
    let completed_at = self.completed_at.unwrap_or(now);
    Ok(Submission {
      submission_id: Uuid::new_v4(),
      organization_id: self.organization_id,
      instructor_id: self.instructor_id,
      rubric_id: None,
      automatic_score: self.automatic_score,
      manual_score: None,
      criterion_scores: None,
      grading_status: status,
      completed_at,
      graded_at: status.is_terminal().then_some(completed_at),
    })
  }
}

/// Scores are percentages.
pub fn check_score(score: f64) -> Result<()> {
  if !(0.0..=100.0).contains(&score) {
    return Err(Error::validation(format!(
      "score must be between 0 and 100, got {score}"
    )));
  }
  Ok(())
}
