//! HTTP layer for Quiz Master.
//!
//! Exposes an axum [`Router`] serving the server-rendered site and the
//! `/quiz-data` JSON report, backed by any [`QuizStore`].

pub mod auth;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod session;
pub mod views;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use quizmaster_core::{
  account::{NewUser, Role},
  store::QuizStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{admin, chapters, member, public, questions, quizzes, report, subjects};
use session::SessionStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from defaults, `config.toml`
/// and `QUIZMASTER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub database_path:   PathBuf,
  /// Key for signing session cookies.
  pub session_secret:  String,
  pub admin_username:  String,
  pub admin_password:  String,
  pub admin_full_name: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: QuizStore> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionStore>,
}

impl<S: QuizStore> AppState<S> {
  pub fn new(store: S, session_secret: &str) -> Result<Self, Error> {
    Ok(AppState {
      store:    Arc::new(store),
      sessions: Arc::new(SessionStore::new(session_secret)?),
    })
  }
}

impl<S: QuizStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    AppState {
      store:    self.store.clone(),
      sessions: self.sessions.clone(),
    }
  }
}

// ─── Bootstrap ────────────────────────────────────────────────────────────────

/// Make sure the configured administrator account exists. An existing
/// account with that username is left untouched.
pub async fn ensure_admin<S: QuizStore>(
  store: &S,
  config: &ServerConfig,
) -> Result<(), Error> {
  let input = NewUser {
    username:      config.admin_username.clone(),
    password_hash: auth::hash_password(&config.admin_password)?,
    full_name:     Some(config.admin_full_name.clone()),
    qualification: None,
    dob:           None,
    role:          Role::Admin,
  };
  match store.ensure_user(input).await.map_err(Error::store)? {
    Some(user) => {
      tracing::info!(user_id = user.id, username = %user.username, "admin account created");
    }
    None => {
      let existing = store
        .find_credentials(config.admin_username.clone())
        .await
        .map_err(Error::store)?;
      match existing.map(|c| c.user.role) {
        Some(Role::Admin) => {
          tracing::debug!(username = %config.admin_username, "admin account already present");
        }
        _ => {
          tracing::warn!(
            username = %config.admin_username,
            "admin username is held by a non-admin account; leaving it unchanged"
          );
        }
      }
    }
  }
  Ok(())
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn not_found() -> Error { Error::NotFound }

/// Build the axum [`Router`] for the whole site.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: QuizStore + 'static,
{
  let sessions = state.sessions.clone();

  Router::new()
    .route("/",                         get(public::home))
    .route("/register",                 get(public::register_form).post(public::register::<S>))
    .route("/login",                    get(public::login_form).post(public::login::<S>))
    .route("/logout",                   get(public::logout))
    .route("/quiz-data",                get(report::quiz_data::<S>))
    // Members
    .route("/user/dashboard",           get(member::dashboard::<S>))
    .route("/user/profile",             get(member::profile_form::<S>).post(member::update_profile::<S>))
    .route("/user/quiz/{id}/take",      get(member::take_quiz::<S>))
    .route("/user/quiz/{id}/submit",    post(member::submit_quiz::<S>))
    // Administration
    .route("/admin_dashboard",          get(admin::dashboard::<S>))
    .route("/admin/users",              get(admin::users::<S>))
    .route("/admin/users/{id}/quizzes", get(admin::user_attempts::<S>))
    .route("/admin/users/{id}/delete",  post(admin::delete_user::<S>))
    .route("/admin/subjects",           get(subjects::list::<S>))
    .route("/admin/subjects/new",       get(subjects::new_form).post(subjects::create::<S>))
    .route("/admin/subjects/{id}",      get(subjects::detail::<S>))
    .route("/admin/subjects/{id}/delete", post(subjects::delete::<S>))
    .route("/admin/chapters",           get(chapters::list::<S>))
    .route("/admin/chapters/new",       get(chapters::new_form::<S>).post(chapters::create::<S>))
    .route("/admin/chapters/{id}",      get(chapters::detail::<S>))
    .route("/admin/chapters/{id}/delete", post(chapters::delete::<S>))
    .route("/admin/quizzes",            get(quizzes::list::<S>))
    .route("/admin/quizzes/new",        get(quizzes::new_form::<S>).post(quizzes::create::<S>))
    .route("/admin/quizzes/{id}",       get(quizzes::detail::<S>))
    .route("/admin/quizzes/{id}/delete", post(quizzes::delete::<S>))
    .route("/admin/questions",          get(questions::list::<S>))
    .route("/admin/questions/new",      get(questions::new_form::<S>).post(questions::create::<S>))
    .route("/admin/questions/{id}",     get(questions::detail::<S>))
    .route("/admin/questions/{id}/delete", post(questions::delete::<S>))
    .fallback(not_found)
    .layer(middleware::from_fn_with_state(sessions, session::layer))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
