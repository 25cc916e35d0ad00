//! Admin CRUD for quizzes.

use axum::{
  Form,
  extract::{Path, Query, State},
  response::{Html, Response},
};
use quizmaster_core::store::QuizStore;

use super::{done, rerender};
use crate::{
  AppState,
  auth::CurrentAdmin,
  error::Error,
  forms::QuizForm,
  views::{self, Chrome, Problem},
};

pub async fn list<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
) -> Result<Html<String>, Error> {
  let quizzes = state.store.list_quizzes(None).await.map_err(Error::store)?;
  let chapters = state.store.list_chapters(None).await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::quizzes(&chrome, &quizzes, &chapters))
}

pub async fn detail<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
  let quiz = state
    .store
    .get_quiz(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  let chapter = state
    .store
    .get_chapter(quiz.chapter_id)
    .await
    .map_err(Error::store)?;
  let questions = state
    .store
    .list_questions(Some(quiz.id))
    .await
    .map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::quiz(&chrome, &quiz, chapter.as_ref(), &questions))
}

/// `?chapter_id=` preselects the parent.
pub async fn new_form<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Query(form): Query<QuizForm>,
) -> Result<Html<String>, Error> {
  let chapters = state.store.list_chapters(None).await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::quiz_form(&chrome, &form, &chapters, None))
}

pub async fn create<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Form(form): Form<QuizForm>,
) -> Result<Response, Error> {
  let outcome = async {
    let input = form.validate()?;
    state.store.create_quiz(input).await.map_err(Error::store)
  }
  .await;

  match outcome {
    Ok(quiz) => {
      tracing::info!(quiz_id = quiz.id, chapter_id = quiz.chapter_id, "quiz created");
      Ok(done(&admin.session, "Quiz created successfully.", "/admin/quizzes"))
    }
    Err(problem) if problem.is_form_problem() => {
      let chapters = state.store.list_chapters(None).await.map_err(Error::store)?;
      let chrome = Chrome::from_session(&admin.session);
      let page = views::catalog::quiz_form(
        &chrome,
        &form,
        &chapters,
        Some(&Problem::from(&problem)),
      );
      Ok(rerender(&problem, page))
    }
    Err(e) => Err(e),
  }
}

pub async fn delete<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<Response, Error> {
  let quiz = state
    .store
    .get_quiz(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  state.store.delete_quiz(quiz.id).await.map_err(Error::store)?;
  tracing::info!(quiz_id = quiz.id, "quiz deleted");
  Ok(done(&admin.session, "Quiz deleted successfully.", "/admin/quizzes"))
}
