//! Handlers for `/submissions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submissions` | Body: [`NewSubmission`]; returns 201 |
//! | `GET`  | `/submissions/pending` | `?instructor_id` required; oldest first |
//! | `GET`  | `/submissions/{id}` | 404 if not found |
//! | `POST` | `/submissions/{id}/begin` | `pending → grading` |
//! | `POST` | `/submissions/{id}/grade/rubric` | Body: [`RubricGradeBody`] |
//! | `POST` | `/submissions/{id}/grade/manual` | Body: `{"score": 0..=100}` |
//!
//! Illegal transitions answer 409.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  score::CriterionSelection,
  store::GradingStore,
  submission::{NewSubmission, Submission},
};
use uuid::Uuid;

use crate::{
  caller::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

/// `POST /submissions`
pub async fn record<S: GradingStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewSubmission>,
) -> Result<impl IntoResponse, ApiError> {
  let submission = store.record_submission(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(submission)))
}

#[derive(Debug, Deserialize)]
pub struct PendingParams {
  pub instructor_id: Uuid,
}

/// `GET /submissions/pending?instructor_id=<id>`
pub async fn pending<S: GradingStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<PendingParams>,
) -> Result<Json<Vec<Submission>>, ApiError> {
  let queue = store
    .pending_grading(params.instructor_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(queue))
}

/// `GET /submissions/{id}`
pub async fn get_one<S: GradingStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Submission>, ApiError> {
  let submission = store
    .get_submission(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;
  Ok(Json(submission))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `POST /submissions/{id}/begin`
pub async fn begin<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Submission>, ApiError> {
  let submission = store.begin_grading(id, actor).await.map_err(ApiError::store)?;
  Ok(Json(submission))
}

#[derive(Debug, Deserialize)]
pub struct RubricGradeBody {
  pub rubric_id:  Uuid,
  /// One entry per criterion of the rubric.
  pub selections: Vec<CriterionSelection>,
}

/// `POST /submissions/{id}/grade/rubric`
pub async fn grade_rubric<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<RubricGradeBody>,
) -> Result<Json<Submission>, ApiError> {
  let submission = store
    .grade_with_rubric(id, body.rubric_id, body.selections, actor)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(submission))
}

#[derive(Debug, Deserialize)]
pub struct ManualGradeBody {
  pub score: f64,
}

/// `POST /submissions/{id}/grade/manual`
pub async fn grade_manual<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<ManualGradeBody>,
) -> Result<Json<Submission>, ApiError> {
  let submission = store
    .grade_manually(id, body.score, actor)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(submission))
}
