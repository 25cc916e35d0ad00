//! Admin CRUD for chapters.

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
  forms::ChapterForm,
  views::{self, Chrome, Problem},
};

pub async fn list<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
) -> Result<Html<String>, Error> {
  let chapters = state.store.list_chapters(None).await.map_err(Error::store)?;
  let subjects = state.store.list_subjects().await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::chapters(&chrome, &chapters, &subjects))
}

pub async fn detail<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
  let chapter = state
    .store
    .get_chapter(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  let subject = state
    .store
    .get_subject(chapter.subject_id)
    .await
    .map_err(Error::store)?;
  let quizzes = state
    .store
    .list_quizzes(Some(chapter.id))
    .await
    .map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::chapter(&chrome, &chapter, subject.as_ref(), &quizzes))
}

/// `?subject_id=` preselects the parent.
pub async fn new_form<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Query(form): Query<ChapterForm>,
) -> Result<Html<String>, Error> {
  let subjects = state.store.list_subjects().await.map_err(Error::store)?;
  let chrome = Chrome::from_session(&admin.session);
  Ok(views::catalog::chapter_form(&chrome, &form, &subjects, None))
}

pub async fn create<S: QuizStore>(
  State(state): State<AppState<S>>,
  admin: CurrentAdmin,
  Form(form): Form<ChapterForm>,
) -> Result<Response, Error> {
  let outcome = async {
    let input = form.validate()?;
    state.store.create_chapter(input).await.map_err(Error::store)
  }
  .await;

  match outcome {
    Ok(chapter) => {
      tracing::info!(
        chapter_id = chapter.id,
        subject_id = chapter.subject_id,
        "chapter created"
      );
      Ok(done(&admin.session, "Chapter created successfully.", "/admin/chapters"))
    }
    Err(problem) if problem.is_form_problem() => {
      let subjects = state.store.list_subjects().await.map_err(Error::store)?;
      let chrome = Chrome::from_session(&admin.session);
      let page = views::catalog::chapter_form(
        &chrome,
        &form,
        &subjects,
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
  let chapter = state
    .store
    .get_chapter(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;
  state.store.delete_chapter(chapter.id).await.map_err(Error::store)?;
  tracing::info!(chapter_id = chapter.id, "chapter deleted");
  Ok(done(&admin.session, "Chapter deleted successfully.", "/admin/chapters"))
}
