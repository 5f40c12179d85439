//! tally-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), overlays
//! `TALLY_*` environment variables, opens the SQLite store, and serves the
//! grading API under `/api` until interrupted.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash`:
//!
//! ```text
//! cargo run -p tally-server -- --hash-password
//! ```

use std::{path::Path, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tally_server::{ServerConfig, auth::hash_password};
use tally_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tally grading server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    anyhow::ensure!(!password.is_empty(), "refusing to hash an empty password");
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let settings = ServerConfig::load(cli.config).context("invalid configuration")?;

  let store_path = settings.store_location();
  ensure_parent_dir(&store_path)?;
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;

  let app = tally_server::router(Arc::new(store), Arc::new(settings.auth()));
  let address = format!("{}:{}", settings.host, settings.port);

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!(store = %store_path.display(), "listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shut down");
  Ok(())
}

/// Create the directory holding the SQLite file if it is missing.
fn ensure_parent_dir(store_path: &Path) -> anyhow::Result<()> {
  if store_path == Path::new(":memory:") {
    return Ok(());
  }
  if let Some(dir) = store_path.parent()
    && !dir.as_os_str().is_empty()
    && !dir.exists()
  {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {}", dir.display()))?;
    tracing::info!(dir = %dir.display(), "created store directory");
  }
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!("failed to listen for ctrl-c: {e}");
    std::future::pending::<()>().await;
  }
  tracing::info!("received ctrl-c, draining connections");
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
