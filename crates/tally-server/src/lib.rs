//! HTTP front end for Tally.
//!
//! Serves the JSON API from `tally-api` under `/api`, behind HTTP Basic
//! authentication, with every request traced.

pub mod auth;
pub mod settings;

use std::sync::Arc;

use axum::{Router, middleware};
use tally_core::store::GradingStore;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

pub use settings::{ServerConfig, SettingsError};

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<S>(store: Arc<S>, auth: Arc<AuthConfig>) -> Router
where
  S: GradingStore + 'static,
{
  Router::new()
    .nest("/api", tally_api::api_router(store))
    .layer(middleware::from_fn_with_state(auth, require_auth))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
