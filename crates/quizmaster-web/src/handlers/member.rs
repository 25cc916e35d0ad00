//! Signed-in user pages: dashboard, profile, taking a quiz.

use axum::{
  Form,
  extract::{Path, State},
  response::{Html, Response},
};
use quizmaster_core::{account::User, attempt::Answers, store::QuizStore};

use super::{done, rerender};
use crate::{
  AppState,
  auth::CurrentUser,
  error::Error,
  forms::ProfileForm,
  session::FlashLevel,
  views::{self, Chrome, Problem},
};

/// End a session that outlived its account.
fn account_gone(current: &CurrentUser) -> Error {
  current.session.sign_out();
  current
    .session
    .flash(FlashLevel::Error, "Your account no longer exists.");
  Error::Unauthorized
}

/// The caller's account.
async fn account<S: QuizStore>(
  state: &AppState<S>,
  current: &CurrentUser,
) -> Result<User, Error> {
  state
    .store
    .get_user(current.user_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| account_gone(current))
}

pub async fn dashboard<S: QuizStore>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<Html<String>, Error> {
  let user = account(&state, &current).await?;
  let quizzes = state.store.list_quizzes(None).await.map_err(Error::store)?;
  let attempts = state
    .store
    .list_attempts(user.id)
    .await
    .map_err(Error::store)?;
  let chrome = Chrome::from_session(&current.session);
  Ok(views::member::dashboard(&chrome, &user, &quizzes, &attempts))
}

pub async fn profile_form<S: QuizStore>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<Html<String>, Error> {
  let user = account(&state, &current).await?;
  let chrome = Chrome::from_session(&current.session);
  Ok(views::member::profile(&chrome, &user, &ProfileForm::from(&user), None))
}

pub async fn update_profile<S: QuizStore>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Form(form): Form<ProfileForm>,
) -> Result<Response, Error> {
  let profile = match form.validate() {
    Ok(profile) => profile,
    Err(problem) => {
      let user = account(&state, &current).await?;
      let chrome = Chrome::from_session(&current.session);
      let page = views::member::profile(
        &chrome,
        &user,
        &form,
        Some(&Problem::from(&problem)),
      );
      return Ok(rerender(&problem, page));
    }
  };

  state
    .store
    .update_profile(current.user_id, profile)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| account_gone(&current))?;

  tracing::info!(user_id = current.user_id, "profile updated");
  Ok(done(
    &current.session,
    "Profile updated successfully!",
    "/user/dashboard",
  ))
}

pub async fn take_quiz<S: QuizStore>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(quiz_id): Path<i64>,
) -> Result<Html<String>, Error> {
  account(&state, &current).await?;
  let quiz = state
    .store
    .get_quiz(quiz_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  let questions = state
    .store
    .list_questions(Some(quiz.id))
    .await
    .map_err(Error::store)?;
  let chrome = Chrome::from_session(&current.session);
  Ok(views::member::take_quiz(&chrome, &quiz, &questions))
}

pub async fn submit_quiz<S: QuizStore>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  Path(quiz_id): Path<i64>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, Error> {
  let user = account(&state, &current).await?;
  let answers = Answers::from_form(pairs);
  let graded = state
    .store
    .submit_quiz(user.id, quiz_id, answers)
    .await
    .map_err(|e| match Error::store(e) {
      // Deleted between the lookup above and the insert.
      Error::InvalidField { field: "user_id", .. } => account_gone(&current),
      e => e,
    })?
    .ok_or(Error::NotFound)?;

  tracing::info!(
    user_id = current.user_id,
    quiz_id,
    score = graded.score.score,
    questions = graded.question_count,
    "quiz submitted"
  );
  Ok(done(
    &current.session,
    format!(
      "You completed the quiz! Your score: {}/{}",
      graded.score.score, graded.question_count
    ),
    "/user/dashboard",
  ))
}
