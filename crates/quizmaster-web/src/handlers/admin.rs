//! Admin dashboard and account management.

use axum::{
  extract::{Path, State},
  response::{Html, IntoResponse, Redirect, Response},
};
use quizmaster_core::store::QuizStore;

use super::done;
use crate::{
  AppState,
  auth::CurrentAdmin,
  error::Error,
  session::FlashLevel,
  views::{self, Chrome},
};

pub async fn dashboard<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
) -> Result<Html<String>, Error> {
  let stats = state.store.subject_stats().await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::admin::dashboard(&chrome, &stats))
}

pub async fn users<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
) -> Result<Html<String>, Error> {
  let users = state.store.list_users().await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::admin::users(&chrome, &users))
}

pub async fn user_attempts<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Path(user_id): Path<i64>,
) -> Result<Html<String>, Error> {
  let user = state
    .store
    .get_user(user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  let attempts = state
    .store
    .list_attempts(user.id)
    .await
    .map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::admin::user_attempts(&chrome, &user, &attempts))
}

pub async fn delete_user<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Path(user_id): Path<i64>,
) -> Result<Response, Error> {
  let user = state
    .store
    .get_user(user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;

  if user.id == admin.user_id {
    admin
      .session
      .flash(FlashLevel::Error, "You cannot delete the account you are signed in with.");
    return Ok(Redirect::to("/admin/users").into_response());
  }

  state.store.delete_user(user.id).await.map_err(Error::store)?;
  let sessions = state.sessions.sign_out_user(user.id);
  tracing::info!(
    user_id = user.id,
    username = %user.username,
    sessions,
    "account deleted"
  );
  Ok(done(
    &admin.session,
    format!("User {} has been deleted.", user.username),
    "/admin/users",
  ))
}
