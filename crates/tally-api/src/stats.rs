//! Handler for `GET /stats`.
//!
//! Exactly one of `?organization_id=<id>` or `?instructor_id=<id>` selects
//! the scope; anything else is a 400.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
};
use serde::Deserialize;
use tally_core::{
  stats::{GradingScope, GradingStats},
  store::GradingStore,
};
use uuid::Uuid;

use crate::{error::ApiError, extract::QueryParams};

#[derive(Debug, Deserialize)]
pub struct StatsParams {
  pub organization_id: Option<Uuid>,
  pub instructor_id:   Option<Uuid>,
}

impl StatsParams {
  fn scope(&self) -> Result<GradingScope, ApiError> {
    match (self.organization_id, self.instructor_id) {
      (Some(org), None) => Ok(GradingScope::Organization(org)),
      (None, Some(instructor)) => Ok(GradingScope::Instructor(instructor)),
      _ => Err(ApiError::BadRequest(
        "pass exactly one of organization_id or instructor_id".to_owned(),
      )),
    }
  }
}

/// `GET /stats?organization_id=<id>` or `GET /stats?instructor_id=<id>`
pub async fn handler<S: GradingStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<StatsParams>,
) -> Result<Json<GradingStats>, ApiError> {
  let stats = store
    .grading_stats(params.scope()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stats))
}
