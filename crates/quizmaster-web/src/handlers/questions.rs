//! Admin CRUD for questions.

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
  forms::QuestionForm,
  views::{self, Chrome, Problem},
};

pub async fn list<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
) -> Result<Html<String>, Error> {
  let questions = state.store.list_questions(None).await.map_err(Error::store)?;
  let quizzes = state.store.list_quizzes(None).await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::questions(&chrome, &questions, &quizzes))
}

pub async fn detail<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
  let question = state
    .store
    .get_question(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  let quiz = state
    .store
    .get_quiz(question.quiz_id)
    .await
    .map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::question(&chrome, &question, quiz.as_ref()))
}

/// `?quiz_id=` preselects the parent.
pub async fn new_form<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Query(form): Query<QuestionForm>,
) -> Result<Html<String>, Error> {
  let quizzes = state.store.list_quizzes(None).await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::question_form(&chrome, &form, &quizzes, None))
}

pub async fn create<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Form(form): Form<QuestionForm>,
) -> Result<Response, Error> {
  let outcome = async {
    let input = form.validate()?;
    state.store.create_question(input).await.map_err(Error::store)
  }
  .await;

  match outcome {
    Ok(question) => {
      tracing::info!(
        question_id = question.id,
        quiz_id = question.quiz_id,
        "question created"
      );
      Ok(done(&admin.session, "Question created successfully.", "/admin/questions"))
    }
    Err(problem) if problem.is_form_problem() => {
      let quizzes = state.store.list_quizzes(None).await.map_err(Error::store)?;
      let chrome = Chrome::from_session(&admin.session);
      let page = views::catalog::question_form(
        &chrome,
        &form,
        &quizzes,
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
  let question = state
    .store
    .get_question(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  state.store.delete_question(question.id).await.map_err(Error::store)?;
  tracing::info!(question_id = question.id, "question deleted");
  Ok(done(&admin.session, "Question deleted successfully.", "/admin/questions"))
}
