//! Server settings: built-in defaults, then the TOML file, then `TALLY_*`
//! environment variables. Checked once at startup so a bad hash or username
//! fails fast instead of locking every request out.

use std::path::{Path, PathBuf};

use argon2::PasswordHash;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::AuthConfig;

pub const ENV_PREFIX: &str = "TALLY";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_PATH: &str = "~/.local/share/tally/tally.db";

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("failed to load configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("auth_username must be non-empty and must not contain ':'")]
  Username,

  #[error("auth_password_hash is not an argon2 PHC string: {0}")]
  PasswordHash(String),

  #[error("store_path must not be empty")]
  StorePath,
}

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// SQLite file. A leading `~/` is expanded against `$HOME`.
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

impl ServerConfig {
  /// Layer the sources and validate the result. A missing file is fine as
  /// long as the environment supplies the credentials.
  pub fn load(path: PathBuf) -> Result<Self, SettingsError> {
    let settings: Self = config::Config::builder()
      .set_default("host", DEFAULT_HOST)?
      .set_default("port", i64::from(DEFAULT_PORT))?
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()?;
    settings.validate()?;
    Ok(settings)
  }

  pub fn validate(&self) -> Result<(), SettingsError> {
    if self.auth_username.is_empty() || self.auth_username.contains(':') {
      return Err(SettingsError::Username);
    }
    PasswordHash::new(&self.auth_password_hash)
      .map_err(|e| SettingsError::PasswordHash(e.to_string()))?;
    if self.store_path.as_os_str().is_empty() {
      return Err(SettingsError::StorePath);
    }
    Ok(())
  }

  /// `store_path` with `~/` expanded.
  pub fn store_location(&self) -> PathBuf {
    expand_home(&self.store_path, std::env::var("HOME").ok().as_deref())
  }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

fn expand_home(path: &Path, home: Option<&str>) -> PathBuf {
  let s = path.to_string_lossy();
  match (s.strip_prefix("~/"), home) {
    (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
