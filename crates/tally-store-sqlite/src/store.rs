//! [`SqliteStore`]: the SQLite implementation of [`GradingStore`].

use std::{path::Path, time::Duration};

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tally_core::{
  actor::Actor,
  rubric::{NewRubric, Rubric, RubricPatch},
  score::{CriterionSelection, score_complete},
  seed::default_rubric,
  stats::{GradingScope, GradingStats},
  store::GradingStore,
  submission::{CriterionScore, NewSubmission, Submission, check_score},
  workflow::{GradingStatus, Transition},
};

use crate::{
  Error, Result,
  encode::{
    RUBRIC_COLUMNS, RawRubric, RawSubmission, SUBMISSION_COLUMNS, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Current time at the precision timestamps are stored with, so values
/// returned from a write compare equal to what a later read decodes.
fn now() -> DateTime<Utc> {
  Utc::now().trunc_subsecs(6)
}

// ─── Closure plumbing ────────────────────────────────────────────────────────

/// Carry a failure out of a connection closure. The matching
/// `From<tokio_rusqlite::Error>` impl unwraps it on the other side.
fn abort(e: impl Into<Error>) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e.into()))
}

fn begin_immediate(
  conn: &mut Connection,
) -> rusqlite::Result<rusqlite::Transaction<'_>> {
  conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

// ─── Rubric rows ─────────────────────────────────────────────────────────────

fn select_rubric(
  conn: &Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawRubric>> {
  conn
    .query_row(
      &format!("SELECT {RUBRIC_COLUMNS} FROM rubrics WHERE rubric_id = ?1"),
      [id_str],
      RawRubric::from_row,
    )
    .optional()
}

/// Load a rubric or fail with `NotFound`.
fn load_rubric(conn: &Connection, id: Uuid) -> tokio_rusqlite::Result<Rubric> {
  select_rubric(conn, &encode_uuid(id))?
    .ok_or_else(|| abort(tally_core::Error::rubric_not_found(id)))?
    .into_rubric()
    .map_err(abort)
}

fn insert_rubric(conn: &Connection, rubric: &Rubric) -> tokio_rusqlite::Result<()> {
  let raw = RawRubric::encode(rubric).map_err(abort)?;
  conn.execute(
    &format!(
      "INSERT INTO rubrics ({RUBRIC_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    ),
    rusqlite::params![
      raw.rubric_id,
      raw.organization_id,
      raw.name,
      raw.description,
      raw.is_default,
      raw.criteria_json,
      raw.created_by,
      raw.created_at,
      raw.updated_at,
    ],
  )?;
  Ok(())
}

fn write_rubric(conn: &Connection, rubric: &Rubric) -> tokio_rusqlite::Result<()> {
  let raw = RawRubric::encode(rubric).map_err(abort)?;
  conn.execute(
    "UPDATE rubrics
        SET name = ?2, description = ?3, is_default = ?4,
            criteria_json = ?5, updated_at = ?6
      WHERE rubric_id = ?1",
    rusqlite::params![
      raw.rubric_id,
      raw.name,
      raw.description,
      raw.is_default,
      raw.criteria_json,
      raw.updated_at,
    ],
  )?;
  Ok(())
}

/// Clear `is_default` on every rubric of the organization. Must run in the
/// same transaction as whatever sets the new default.
fn clear_defaults(
  conn: &Connection,
  organization_id: Uuid,
  now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE rubrics SET is_default = 0, updated_at = ?2
      WHERE organization_id = ?1 AND is_default = 1",
    rusqlite::params![encode_uuid(organization_id), encode_dt(now)],
  )
}

fn query_rubrics(
  conn: &Connection,
  where_clause: &str,
  organization_id: Uuid,
) -> rusqlite::Result<Vec<RawRubric>> {
  // rowid breaks created_at ties in insertion order.
  let mut stmt = conn.prepare(&format!(
    "SELECT {RUBRIC_COLUMNS} FROM rubrics
      WHERE {where_clause}
      ORDER BY is_default DESC, created_at DESC, rowid DESC"
  ))?;
  let rows = stmt
    .query_map([encode_uuid(organization_id)], RawRubric::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── Submission rows ─────────────────────────────────────────────────────────

fn select_submission(
  conn: &Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawSubmission>> {
  conn
    .query_row(
      &format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = ?1"
      ),
      [id_str],
      RawSubmission::from_row,
    )
    .optional()
}

fn load_submission(
  conn: &Connection,
  id: Uuid,
) -> tokio_rusqlite::Result<Submission> {
  select_submission(conn, &encode_uuid(id))?
    .ok_or_else(|| abort(tally_core::Error::submission_not_found(id)))?
    .into_submission()
    .map_err(abort)
}

/// Persist the grading fields of `submission`, but only if the row is still
/// in `expected`. Returns the number of rows changed (0 or 1).
fn write_grading_fields(
  conn: &Connection,
  submission: &Submission,
  expected: GradingStatus,
) -> tokio_rusqlite::Result<usize> {
  let raw = RawSubmission::encode(submission).map_err(abort)?;
  Ok(conn.execute(
    "UPDATE submissions
        SET rubric_id = ?2, manual_score = ?3, criterion_scores = ?4,
            grading_status = ?5, graded_at = ?6
      WHERE submission_id = ?1 AND grading_status = ?7",
    rusqlite::params![
      raw.submission_id,
      raw.rubric_id,
      raw.manual_score,
      raw.criterion_scores,
      raw.grading_status,
      raw.graded_at,
      encode_status(expected),
    ],
  )?)
}

/// What a finalize call records.
enum Grade {
  Manual(f64),
  Rubric {
    rubric_id:  Uuid,
    selections: Vec<CriterionSelection>,
  },
}

impl Grade {
  /// Fill in the score fields on `submission`, reading the rubric from the
  /// same transaction.
  fn record(
    self,
    conn: &Connection,
    submission: &mut Submission,
  ) -> tokio_rusqlite::Result<()> {
    match self {
      Grade::Manual(score) => {
        check_score(score).map_err(abort)?;
        submission.manual_score = Some(score);
        submission.rubric_id = None;
        submission.criterion_scores = None;
      }
      Grade::Rubric { rubric_id, selections } => {
        let rubric = load_rubric(conn, rubric_id)?;
        if rubric.organization_id != submission.organization_id {
          return Err(abort(tally_core::Error::validation(format!(
            "rubric {rubric_id} belongs to another organization"
          ))));
        }
        let breakdown = score_complete(&rubric, &selections).map_err(abort)?;
        check_score(breakdown.percentage).map_err(abort)?;
        submission.criterion_scores = Some(
          breakdown
            .per_criterion
            .iter()
            .enumerate()
            .map(|(criterion_index, &awarded_points)| CriterionScore {
              criterion_index,
              awarded_points,
            })
            .collect(),
        );
        submission.manual_score = Some(breakdown.percentage);
        submission.rubric_id = Some(rubric_id);
      }
    }
    Ok(())
  }
}

fn stale_write(submission_id: Uuid) -> tokio_rusqlite::Error {
  abort(tally_core::Error::State(format!(
    "submission {submission_id} changed status concurrently"
  )))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally grading store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a built rubric, first clearing the organization's other
  /// defaults if it is marked default. One transaction.
  async fn insert_exclusive(&self, rubric: Rubric) -> Result<Rubric> {
    let rubric = self
      .conn
      .call(move |conn| {
        let tx = begin_immediate(conn)?;
        if rubric.is_default {
          clear_defaults(&tx, rubric.organization_id, rubric.created_at)?;
        }
        insert_rubric(&tx, &rubric)?;
        tx.commit()?;
        Ok(rubric)
      })
      .await?;
    Ok(rubric)
  }

  /// Move a submission to `Graded`. Status check, scoring and write share
  /// one transaction, and the write is guarded on the status that was read.
  async fn finalize(
    &self,
    submission_id: Uuid,
    grade: Grade,
    actor: Actor,
  ) -> Result<Submission> {
    let now = now();
    let submission = self
      .conn
      .call(move |conn| {
        let tx = begin_immediate(conn)?;
        let mut submission = load_submission(&tx, submission_id)?;
        actor
          .authorize_grading(submission.organization_id, submission.instructor_id)
          .map_err(abort)?;

        let previous = submission.grading_status;
        let next = previous.apply(Transition::Finalize).map_err(abort)?;
        grade.record(&tx, &mut submission)?;
        submission.grading_status = next;
        submission.graded_at = Some(now);

        if write_grading_fields(&tx, &submission, previous)? != 1 {
          return Err(stale_write(submission_id));
        }
        tx.commit()?;
        Ok(submission)
      })
      .await?;

    tracing::info!(
      submission = %submission.submission_id,
      grader = %actor.id,
      score = ?submission.manual_score,
      rubric = ?submission.rubric_id,
      "submission graded"
    );
    Ok(submission)
  }
}

// ─── GradingStore impl ───────────────────────────────────────────────────────

impl GradingStore for SqliteStore {
  type Error = Error;

  // ── Rubrics ───────────────────────────────────────────────────────────────

  async fn create_rubric(&self, input: NewRubric, actor: Actor) -> Result<Rubric> {
    actor.authorize_rubric_write(input.organization_id)?;
    input.validate()?;

    let rubric = self
      .insert_exclusive(input.into_rubric(actor.id, now()))
      .await?;
    tracing::info!(
      rubric = %rubric.rubric_id,
      organization = %rubric.organization_id,
      is_default = rubric.is_default,
      "rubric created"
    );
    Ok(rubric)
  }

  async fn update_rubric(
    &self,
    rubric_id: Uuid,
    patch: RubricPatch,
    actor: Actor,
  ) -> Result<Rubric> {
    let now = now();
    let rubric = self
      .conn
      .call(move |conn| {
        let tx = begin_immediate(conn)?;
        let mut rubric = load_rubric(&tx, rubric_id)?;
        actor
          .authorize_rubric_write(rubric.organization_id)
          .map_err(abort)?;

        let becomes_default = patch.is_default == Some(true) && !rubric.is_default;
        rubric.apply(patch, now).map_err(abort)?;
        if becomes_default {
          clear_defaults(&tx, rubric.organization_id, now)?;
        }
        write_rubric(&tx, &rubric)?;
        tx.commit()?;
        Ok(rubric)
      })
      .await?;

    tracing::debug!(rubric = %rubric_id, "rubric updated");
    Ok(rubric)
  }

  async fn remove_rubric(&self, rubric_id: Uuid, actor: Actor) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = begin_immediate(conn)?;
        let rubric = load_rubric(&tx, rubric_id)?;
        actor
          .authorize_rubric_write(rubric.organization_id)
          .map_err(abort)?;
        if rubric.is_default {
          return Err(abort(tally_core::Error::InvariantViolation(
            "cannot remove the default rubric; promote another rubric first"
              .to_owned(),
          )));
        }
        tx.execute(
          "DELETE FROM rubrics WHERE rubric_id = ?1",
          [encode_uuid(rubric_id)],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(rubric = %rubric_id, "rubric removed");
    Ok(())
  }

  async fn set_default_rubric(&self, rubric_id: Uuid, actor: Actor) -> Result<()> {
    let now = now();
    let organization_id = self
      .conn
      .call(move |conn| {
        let tx = begin_immediate(conn)?;
        let mut rubric = load_rubric(&tx, rubric_id)?;
        actor
          .authorize_rubric_write(rubric.organization_id)
          .map_err(abort)?;
        if !rubric.is_default {
          clear_defaults(&tx, rubric.organization_id, now)?;
          rubric.is_default = true;
          rubric.updated_at = now;
          write_rubric(&tx, &rubric)?;
        }
        tx.commit()?;
        Ok(rubric.organization_id)
      })
      .await?;

    tracing::info!(
      rubric = %rubric_id,
      organization = %organization_id,
      "default rubric designated"
    );
    Ok(())
  }

  async fn get_rubric(&self, rubric_id: Uuid) -> Result<Option<Rubric>> {
    let id_str = encode_uuid(rubric_id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_rubric(conn, &id_str)?))
      .await?;
    raw.map(RawRubric::into_rubric).transpose()
  }

  async fn list_rubrics(&self, organization_id: Uuid) -> Result<Vec<Rubric>> {
    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_rubrics(conn, "organization_id = ?1", organization_id)?)
      })
      .await?;
    raws.into_iter().map(RawRubric::into_rubric).collect()
  }

  async fn get_default_rubric(&self, organization_id: Uuid) -> Result<Option<Rubric>> {
    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_rubrics(
          conn,
          "organization_id = ?1 AND is_default = 1",
          organization_id,
        )?)
      })
      .await?;
    raws.into_iter().next().map(RawRubric::into_rubric).transpose()
  }

  async fn duplicate_rubric(&self, rubric_id: Uuid, actor: Actor) -> Result<Rubric> {
    let now = now();
    let copy = self
      .conn
      .call(move |conn| {
        let tx = begin_immediate(conn)?;
        let original = load_rubric(&tx, rubric_id)?;
        actor
          .authorize_rubric_write(original.organization_id)
          .map_err(abort)?;
        let copy = original.duplicate(actor.id, now);
        insert_rubric(&tx, &copy)?;
        tx.commit()?;
        Ok(copy)
      })
      .await?;

    tracing::info!(rubric = %copy.rubric_id, source = %rubric_id, "rubric duplicated");
    Ok(copy)
  }

  async fn create_default_rubric(
    &self,
    organization_id: Uuid,
    actor: Actor,
  ) -> Result<Rubric> {
    actor.authorize_rubric_write(organization_id)?;
    let rubric = self
      .insert_exclusive(default_rubric(organization_id).into_rubric(actor.id, now()))
      .await?;
    tracing::info!(
      rubric = %rubric.rubric_id,
      organization = %organization_id,
      "default rubric seeded"
    );
    Ok(rubric)
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn record_submission(&self, mut input: NewSubmission) -> Result<Submission> {
    input.completed_at = input.completed_at.map(|t| t.trunc_subsecs(6));
    let submission = input.into_submission(now())?;
    let raw = RawSubmission::encode(&submission)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO submissions ({SUBMISSION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
          ),
          rusqlite::params![
            raw.submission_id,
            raw.organization_id,
            raw.instructor_id,
            raw.rubric_id,
            raw.automatic_score,
            raw.manual_score,
            raw.criterion_scores,
            raw.grading_status,
            raw.completed_at,
            raw.graded_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      submission = %submission.submission_id,
      status = submission.grading_status.as_str(),
      "submission recorded"
    );
    Ok(submission)
  }

  async fn get_submission(&self, submission_id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(submission_id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_submission(conn, &id_str)?))
      .await?;
    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn pending_grading(&self, instructor_id: Uuid) -> Result<Vec<Submission>> {
    let id_str = encode_uuid(instructor_id);
    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLUMNS} FROM submissions
            WHERE instructor_id = ?1
              AND grading_status IN ('pending', 'grading')
            ORDER BY completed_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map([id_str], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn begin_grading(&self, submission_id: Uuid, actor: Actor) -> Result<Submission> {
    let submission = self
      .conn
      .call(move |conn| {
        let tx = begin_immediate(conn)?;
        let mut submission = load_submission(&tx, submission_id)?;
        actor
          .authorize_grading(submission.organization_id, submission.instructor_id)
          .map_err(abort)?;

        let previous = submission.grading_status;
        submission.grading_status =
          previous.apply(Transition::Begin).map_err(abort)?;
        if write_grading_fields(&tx, &submission, previous)? != 1 {
          return Err(stale_write(submission_id));
        }
        tx.commit()?;
        Ok(submission)
      })
      .await?;

    tracing::debug!(submission = %submission_id, grader = %actor.id, "grading started");
    Ok(submission)
  }

  async fn grade_with_rubric(
    &self,
    submission_id: Uuid,
    rubric_id: Uuid,
    selections: Vec<CriterionSelection>,
    actor: Actor,
  ) -> Result<Submission> {
    self
      .finalize(submission_id, Grade::Rubric { rubric_id, selections }, actor)
      .await
  }

  async fn grade_manually(
    &self,
    submission_id: Uuid,
    score: f64,
    actor: Actor,
  ) -> Result<Submission> {
    self.finalize(submission_id, Grade::Manual(score), actor).await
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn grading_stats(&self, scope: GradingScope) -> Result<GradingStats> {
    let (column, id) = match scope {
      GradingScope::Organization(id) => ("organization_id", id),
      GradingScope::Instructor(id) => ("instructor_id", id),
    };
    let id_str = encode_uuid(id);

    // One statement, so every figure comes from the same snapshot.
    let (total, pending, graded, mean): (i64, i64, i64, Option<f64>) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(grading_status IN ('pending', 'grading')), 0),
                    COALESCE(SUM(grading_status IN ('graded', 'auto_graded')), 0),
                    AVG(COALESCE(manual_score, automatic_score))
               FROM submissions
              WHERE {column} = ?1"
          ),
          [id_str],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?)
      })
      .await?;

    Ok(GradingStats::from_parts(
      total as u64,
      pending as u64,
      graded as u64,
      mean,
    ))
  }
}
