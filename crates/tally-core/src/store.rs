//! The `GradingStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`, `tally-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  AsGradingError,
  actor::Actor,
  rubric::{NewRubric, Rubric, RubricPatch},
  score::CriterionSelection,
  stats::{GradingScope, GradingStats},
  submission::{NewSubmission, Submission},
};

/// Abstraction over a Tally storage backend.
///
/// Backends must make two sequences atomic: clearing and setting the
/// organization's default rubric, and checking-then-finalizing a
/// submission's grade. No reader may ever observe two default rubrics in one
/// organization, and two concurrent finalizes of one submission must not
/// both succeed.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait GradingStore: Send + Sync {
  type Error: std::error::Error + AsGradingError + Send + Sync + 'static;

  // ── Rubrics ───────────────────────────────────────────────────────────

  /// Validate and persist a new rubric. When `input.is_default` is set, the
  /// organization's previous default is cleared in the same transaction.
  fn create_rubric(
    &self,
    input: NewRubric,
    actor: Actor,
  ) -> impl Future<Output = Result<Rubric, Self::Error>> + Send + '_;

  /// Apply a partial update. Setting `is_default` to `true` clears the
  /// organization's other defaults atomically.
  fn update_rubric(
    &self,
    rubric_id: Uuid,
    patch: RubricPatch,
    actor: Actor,
  ) -> impl Future<Output = Result<Rubric, Self::Error>> + Send + '_;

  /// Delete a rubric. Fails with an invariant violation if it is the
  /// organization's current default.
  fn remove_rubric(
    &self,
    rubric_id: Uuid,
    actor: Actor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Make `rubric_id` the only default rubric of its organization.
  fn set_default_rubric(
    &self,
    rubric_id: Uuid,
    actor: Actor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a rubric by id. Returns `None` if not found.
  fn get_rubric(
    &self,
    rubric_id: Uuid,
  ) -> impl Future<Output = Result<Option<Rubric>, Self::Error>> + Send + '_;

  /// All rubrics of an organization: the default first, then newest first.
  fn list_rubrics(
    &self,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Rubric>, Self::Error>> + Send + '_;

  fn get_default_rubric(
    &self,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<Option<Rubric>, Self::Error>> + Send + '_;

  /// Deep-copy a rubric into a new, non-default rubric of the same
  /// organization. Every call creates a new rubric.
  fn duplicate_rubric(
    &self,
    rubric_id: Uuid,
    actor: Actor,
  ) -> impl Future<Output = Result<Rubric, Self::Error>> + Send + '_;

  /// Seed the canonical starter rubric as the organization's default.
  fn create_default_rubric(
    &self,
    organization_id: Uuid,
    actor: Actor,
  ) -> impl Future<Output = Result<Rubric, Self::Error>> + Send + '_;

  // ── Submissions ───────────────────────────────────────────────────────

  /// Accept a submission from the quiz flow in its initial status.
  fn record_submission(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  fn get_submission(
    &self,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Submissions assigned to `instructor_id` that are `pending` or
  /// `grading`, oldest first.
  fn pending_grading(
    &self,
    instructor_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// `pending → grading`.
  fn begin_grading(
    &self,
    submission_id: Uuid,
    actor: Actor,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Score the submission against a rubric and finalize it as `graded`.
  ///
  /// Every criterion of the rubric must be selected exactly once.
  fn grade_with_rubric(
    &self,
    submission_id: Uuid,
    rubric_id: Uuid,
    selections: Vec<CriterionSelection>,
    actor: Actor,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Record a free-form percentage score and finalize as `graded`.
  fn grade_manually(
    &self,
    submission_id: Uuid,
    score: f64,
    actor: Actor,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// Counts and average score over the scope, read from one consistent
  /// snapshot.
  fn grading_stats(
    &self,
    scope: GradingScope,
  ) -> impl Future<Output = Result<GradingStats, Self::Error>> + Send + '_;
}
