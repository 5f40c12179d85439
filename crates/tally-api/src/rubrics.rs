//! Handlers for `/rubrics` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/rubrics` | `?organization_id` required; default first, then newest |
//! | `POST`   | `/rubrics` | Body: [`NewRubric`]; returns 201 |
//! | `GET`    | `/rubrics/default` | `?organization_id` required; 404 if none |
//! | `POST`   | `/rubrics/seed` | Body: `{"organization_id":"..."}`; returns 201 |
//! | `GET`    | `/rubrics/{id}` | 404 if not found |
//! | `PATCH`  | `/rubrics/{id}` | Body: [`RubricPatch`] |
//! | `DELETE` | `/rubrics/{id}` | 409 if it is the default; returns 204 |
//! | `POST`   | `/rubrics/{id}/default` | Returns 204 |
//! | `POST`   | `/rubrics/{id}/duplicate` | Returns 201 + the copy |
//! | `POST`   | `/rubrics/{id}/score` | Body: `{"selections":[...]}`; score preview, nothing stored |
//!
//! Every mutating endpoint requires the actor headers (see [`crate::caller`]).

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  rubric::{NewRubric, Rubric, RubricPatch},
  score::{CriterionSelection, ScoreBreakdown, score_rubric},
  store::GradingStore,
};
use uuid::Uuid;

use crate::{
  caller::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

#[derive(Debug, Deserialize)]
pub struct OrganizationParams {
  pub organization_id: Uuid,
}

async fn fetch<S: GradingStore>(store: &S, id: Uuid) -> Result<Rubric, ApiError> {
  store
    .get_rubric(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("rubric {id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /rubrics?organization_id=<id>`
pub async fn list<S: GradingStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<OrganizationParams>,
) -> Result<Json<Vec<Rubric>>, ApiError> {
  let rubrics = store
    .list_rubrics(params.organization_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rubrics))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /rubrics`
pub async fn create<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  JsonBody(body): JsonBody<NewRubric>,
) -> Result<impl IntoResponse, ApiError> {
  let rubric = store.create_rubric(body, actor).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(rubric)))
}

// ─── Default ──────────────────────────────────────────────────────────────────

/// `GET /rubrics/default?organization_id=<id>`
pub async fn get_default<S: GradingStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<OrganizationParams>,
) -> Result<Json<Rubric>, ApiError> {
  let rubric = store
    .get_default_rubric(params.organization_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "organization {} has no default rubric",
        params.organization_id
      ))
    })?;
  Ok(Json(rubric))
}

#[derive(Debug, Deserialize)]
pub struct SeedBody {
  pub organization_id: Uuid,
}

/// `POST /rubrics/seed`
pub async fn seed<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  JsonBody(body): JsonBody<SeedBody>,
) -> Result<impl IntoResponse, ApiError> {
  let rubric = store
    .create_default_rubric(body.organization_id, actor)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(rubric)))
}

/// `POST /rubrics/{id}/default`
pub async fn set_default<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
  store
    .set_default_rubric(id, actor)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Single rubric ────────────────────────────────────────────────────────────

/// `GET /rubrics/{id}`
pub async fn get_one<S: GradingStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Rubric>, ApiError> {
  Ok(Json(fetch(store.as_ref(), id).await?))
}

/// `PATCH /rubrics/{id}`
pub async fn update<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  PathParam(id): PathParam<Uuid>,
  JsonBody(patch): JsonBody<RubricPatch>,
) -> Result<Json<Rubric>, ApiError> {
  let rubric = store
    .update_rubric(id, patch, actor)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rubric))
}

/// `DELETE /rubrics/{id}`
pub async fn remove<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.remove_rubric(id, actor).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /rubrics/{id}/duplicate`
pub async fn duplicate<S: GradingStore>(
  State(store): State<Arc<S>>,
  Caller(actor): Caller,
  PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let copy = store
    .duplicate_rubric(id, actor)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(copy)))
}

// ─── Score preview ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
  pub selections: Vec<CriterionSelection>,
}

/// `POST /rubrics/{id}/score`
///
/// Criteria without a selection score zero, so a grader can watch the total
/// build up before finalizing.
pub async fn score<S: GradingStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<ScoreBody>,
) -> Result<Json<ScoreBreakdown>, ApiError> {
  let rubric = fetch(store.as_ref(), id).await?;
  Ok(Json(score_rubric(&rubric, &body.selections)?))
}
