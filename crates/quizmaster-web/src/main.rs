//! Quiz Master server binary.
//!
//! Reads built-in defaults, then `config.toml` (or the path given with
//! `--config`), then `QUIZMASTER_*` environment variables. Opens the SQLite
//! database, makes sure the administrator account exists, and serves the
//! site over HTTP.
//!
//! `session_secret` and `admin_password` have no defaults:
//!
//! ```text
//! QUIZMASTER_SESSION_SECRET=change-me QUIZMASTER_ADMIN_PASSWORD=admin123 \
//!   cargo run -p quizmaster-web
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use quizmaster_store_sqlite::SqliteStore;
use quizmaster_web::{AppState, ServerConfig, ensure_admin};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Quiz Master web server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080_i64)?
    .set_default("database_path", "quiz_master.db")?
    .set_default("admin_username", "admin@quizmaster.com")?
    .set_default("admin_full_name", "Quiz Master")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("QUIZMASTER"))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("invalid configuration (session_secret and admin_password are required)")?;

  let database_path = expand_tilde(&server_cfg.database_path);
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open database at {database_path:?}"))?;

  ensure_admin(&store, &server_cfg)
    .await
    .context("failed to create the admin account")?;

  let state = AppState::new(store, &server_cfg.session_secret)
    .context("failed to set up sessions")?;
  let app = quizmaster_web::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
