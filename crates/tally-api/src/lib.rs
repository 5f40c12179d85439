//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::GradingStore`].
//! Access control, TLS, and transport concerns are the caller's
//! responsibility; the acting user arrives in request headers
//! (see [`caller`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone()))
//! ```

pub mod caller;
pub mod error;
pub mod extract;
pub mod rubrics;
pub mod stats;
pub mod submissions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tally_core::store::GradingStore;

pub use caller::Caller;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: GradingStore + 'static,
{
  Router::new()
    // Rubrics
    .route("/rubrics", get(rubrics::list::<S>).post(rubrics::create::<S>))
    .route("/rubrics/default", get(rubrics::get_default::<S>))
    .route("/rubrics/seed", post(rubrics::seed::<S>))
    .route(
      "/rubrics/{id}",
      get(rubrics::get_one::<S>)
        .patch(rubrics::update::<S>)
        .delete(rubrics::remove::<S>),
    )
    .route("/rubrics/{id}/default", post(rubrics::set_default::<S>))
    .route("/rubrics/{id}/duplicate", post(rubrics::duplicate::<S>))
    .route("/rubrics/{id}/score", post(rubrics::score::<S>))
    // Submissions
    .route("/submissions", post(submissions::record::<S>))
    .route("/submissions/pending", get(submissions::pending::<S>))
    .route("/submissions/{id}", get(submissions::get_one::<S>))
    .route("/submissions/{id}/begin", post(submissions::begin::<S>))
    .route("/submissions/{id}/grade/rubric", post(submissions::grade_rubric::<S>))
    .route("/submissions/{id}/grade/manual", post(submissions::grade_manual::<S>))
    // Aggregates
    .route("/stats", get(stats::handler::<S>))
    .with_state(store)
}
