//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that text ordering matches chronological ordering. Embedded structures
//! (criteria, criterion scores) are stored as compact JSON. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use tally_core::{
  rubric::{Criterion, Rubric},
  submission::{CriterionScore, Submission},
  workflow::GradingStatus,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── GradingStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: GradingStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<GradingStatus> {
  GradingStatus::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown grading status: {s:?}")))
}

// ─── Embedded JSON ────────────────────────────────────────────────────────────

pub fn encode_criteria(criteria: &[Criterion]) -> Result<String> {
  Ok(serde_json::to_string(criteria)?)
}

pub fn decode_criteria(s: &str) -> Result<Vec<Criterion>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_criterion_scores(scores: &[CriterionScore]) -> Result<String> {
  Ok(serde_json::to_string(scores)?)
}

pub fn decode_criterion_scores(s: &str) -> Result<Vec<CriterionScore>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Rubric rows ─────────────────────────────────────────────────────────────

pub const RUBRIC_COLUMNS: &str = "rubric_id, organization_id, name, description, \
   is_default, criteria_json, created_by, created_at, updated_at";

/// Raw values read directly from a `rubrics` row.
pub struct RawRubric {
  pub rubric_id:       String,
  pub organization_id: String,
  pub name:            String,
  pub description:     String,
  pub is_default:      bool,
  pub criteria_json:   String,
  pub created_by:      String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawRubric {
  /// Read a row selected with [`RUBRIC_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rubric_id:       row.get(0)?,
      organization_id: row.get(1)?,
      name:            row.get(2)?,
      description:     row.get(3)?,
      is_default:      row.get(4)?,
      criteria_json:   row.get(5)?,
      created_by:      row.get(6)?,
      created_at:      row.get(7)?,
      updated_at:      row.get(8)?,
    })
  }

  pub fn encode(rubric: &Rubric) -> Result<Self> {
    Ok(Self {
      rubric_id:       encode_uuid(rubric.rubric_id),
      organization_id: encode_uuid(rubric.organization_id),
      name:            rubric.name.clone(),
      description:     rubric.description.clone(),
      is_default:      rubric.is_default,
      criteria_json:   encode_criteria(&rubric.criteria)?,
      created_by:      encode_uuid(rubric.created_by),
      created_at:      encode_dt(rubric.created_at),
      updated_at:      encode_dt(rubric.updated_at),
    })
  }

  pub fn into_rubric(self) -> Result<Rubric> {
    Ok(Rubric {
      rubric_id:       decode_uuid(&self.rubric_id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      name:            self.name,
      description:     self.description,
      is_default:      self.is_default,
      criteria:        decode_criteria(&self.criteria_json)?,
      created_by:      decode_uuid(&self.created_by)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Submission rows ─────────────────────────────────────────────────────────

pub const SUBMISSION_COLUMNS: &str = "submission_id, organization_id, \
   instructor_id, rubric_id, automatic_score, manual_score, criterion_scores, \
   grading_status, completed_at, graded_at";

/// Raw values read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id:    String,
  pub organization_id:  String,
  pub instructor_id:    String,
  pub rubric_id:        Option<String>,
  pub automatic_score:  Option<f64>,
  pub manual_score:     Option<f64>,
  pub criterion_scores: Option<String>,
  pub grading_status:   String,
  pub completed_at:     String,
  pub graded_at:        Option<String>,
}

impl RawSubmission {
  /// Read a row selected with [`SUBMISSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id:    row.get(0)?,
      organization_id:  row.get(1)?,
      instructor_id:    row.get(2)?,
      rubric_id:        row.get(3)?,
      automatic_score:  row.get(4)?,
      manual_score:     row.get(5)?,
      criterion_scores: row.get(6)?,
      grading_status:   row.get(7)?,
      completed_at:     row.get(8)?,
      graded_at:        row.get(9)?,
    })
  }

  pub fn encode(s: &Submission) -> Result<Self> {
    Ok(Self {
      submission_id:    encode_uuid(s.submission_id),
      organization_id:  encode_uuid(s.organization_id),
      instructor_id:    encode_uuid(s.instructor_id),
      rubric_id:        s.rubric_id.map(encode_uuid),
      automatic_score:  s.automatic_score,
      manual_score:     s.manual_score,
      criterion_scores: s
        .criterion_scores
        .as_deref()
        .map(encode_criterion_scores)
        .transpose()?,
      grading_status:   encode_status(s.grading_status).to_owned(),
      completed_at:     encode_dt(s.completed_at),
      graded_at:        s.graded_at.map(encode_dt),
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id:    decode_uuid(&self.submission_id)?,
      organization_id:  decode_uuid(&self.organization_id)?,
      instructor_id:    decode_uuid(&self.instructor_id)?,
      rubric_id:        self.rubric_id.as_deref().map(decode_uuid).transpose()?,
      automatic_score:  self.automatic_score,
      manual_score:     self.manual_score,
      criterion_scores: self
        .criterion_scores
        .as_deref()
        .map(decode_criterion_scores)
        .transpose()?,
      grading_status:   decode_status(&self.grading_status)?,
      completed_at:     decode_dt(&self.completed_at)?,
      graded_at:        self.graded_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
