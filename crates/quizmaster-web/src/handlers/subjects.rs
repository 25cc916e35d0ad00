//! Admin CRUD for subjects.

use axum::{
  Form,
  extract::{Path, State},
  response::{Html, Response},
};
use quizmaster_core::store::QuizStore;

use super::{done, rerender};
use crate::{
  AppState,
  auth::CurrentAdmin,
  error::Error,
  forms::SubjectForm,
  views::{self, Chrome, Problem},
};

pub async fn list<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
) -> Result<Html<String>, Error> {
  let subjects = state.store.list_subjects().await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::subjects(&chrome, &subjects))
}

pub async fn detail<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
  let subject = state
    .store
    .get_subject(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  let chapters = state
    .store
    .list_chapters(Some(subject.id))
    .await
    .map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::subject(&chrome, &subject, &chapters))
}

pub async fn new_form(admin: CurrentAdmin) -> Html<String> {
  let chrome = Chrome::from_session(&admin.session);
  views::catalog::subject_form(&chrome, &SubjectForm::default(), None)
}

pub async fn create<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Form(form): Form<SubjectForm>,
) -> Result<Response, Error> {
  let outcome = async {
    let input = form.validate()?;
    state.store.create_subject(input).await.map_err(Error::store)
  }
  .await;

  match outcome {
    Ok(subject) => {
      tracing::info!(subject_id = subject.id, name = %subject.name, "subject created");
      Ok(done(&admin.session, "Subject created successfully!", "/admin/subjects"))
    }
    Err(problem) if problem.is_form_problem() => {
      let chrome = Chrome::from_session(&admin.session);
      let page =
        views::catalog::subject_form(&chrome, &form, Some(&Problem::from(&problem)));
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
  let subject = state
    .store
    .get_subject(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  state.store.delete_subject(subject.id).await.map_err(Error::store)?;
  tracing::info!(subject_id = subject.id, name = %subject.name, "subject deleted");
  Ok(done(&admin.session, "Subject deleted successfully!", "/admin/subjects"))
}
