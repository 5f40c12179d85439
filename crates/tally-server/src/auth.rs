//! HTTP Basic authentication in front of the API.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AuthConfig {
  /// Check the Basic credentials carried by `headers`.
  pub fn verify(&self, headers: &HeaderMap) -> Result<(), Unauthorized> {
    let creds = Credentials::from_headers(headers).ok_or(Unauthorized)?;

    // The hash is checked before the username, so a wrong username costs as
    // much as a wrong password.
    let password_ok = PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(creds.password.as_bytes(), &hash)
        .is_ok()
    });

    if password_ok && creds.username == self.username {
      Ok(())
    } else {
      Err(Unauthorized)
    }
  }
}

/// Hash `password` into the PHC string stored as `auth_password_hash`.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Username and password decoded from an `Authorization: Basic` header.
#[derive(Debug, PartialEq, Eq)]
struct Credentials {
  username: String,
  password: String,
}

impl Credentials {
  fn from_headers(headers: &HeaderMap) -> Option<Self> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
      return None;
    }
    let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
    // Passwords may contain ':'; usernames may not.
    let (username, password) = decoded.split_once(':')?;
    Some(Self { username: username.to_owned(), password: password.to_owned() })
  }
}

/// Rejection for a request without valid credentials.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
  fn into_response(self) -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    res.headers_mut().insert(
      header::WWW_AUTHENTICATE,
      HeaderValue::from_static("Basic realm=\"tally\""),
    );
    res
  }
}

/// Middleware: reject the request unless it carries valid credentials.
pub async fn require_auth(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Result<Response, Unauthorized> {
  if let Err(e) = auth.verify(req.headers()) {
    tracing::debug!(uri = %req.uri(), "rejected request without valid credentials");
    return Err(e);
  }
  Ok(next.run(req).await)
}
