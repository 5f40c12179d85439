//! Acting-user extraction.
//!
//! The identity proxy in front of Tally authenticates the user and forwards
//! who they are in three headers:
//!
//! | Header | Value |
//! |--------|-------|
//! | `X-Actor-Id` | user UUID |
//! | `X-Organization-Id` | organization UUID |
//! | `X-Actor-Role` | `admin`, `instructor` or `student` |

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use tally_core::actor::{Actor, Role};
use uuid::Uuid;

use crate::error::ApiError;

pub const ACTOR_ID: &str = "x-actor-id";
pub const ORGANIZATION_ID: &str = "x-organization-id";
pub const ACTOR_ROLE: &str = "x-actor-role";

/// The [`Actor`] performing the request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Actor);

impl<S> FromRequestParts<S> for Caller
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    actor_from_headers(&parts.headers).map(Caller)
  }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
  headers
    .get(name)
    .ok_or_else(|| ApiError::Unauthenticated(format!("missing {name} header")))?
    .to_str()
    .map_err(|_| ApiError::Unauthenticated(format!("{name} is not valid text")))
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Result<Uuid, ApiError> {
  header(headers, name)?
    .trim()
    .parse()
    .map_err(|_| ApiError::Unauthenticated(format!("{name} is not a UUID")))
}

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
  let role = header(headers, ACTOR_ROLE)?;
  Ok(Actor {
    id:              uuid_header(headers, ACTOR_ID)?,
    organization_id: uuid_header(headers, ORGANIZATION_ID)?,
    role:            Role::parse(role.trim())
      .ok_or_else(|| ApiError::Unauthenticated(format!("unknown role {role:?}")))?,
  })
}
