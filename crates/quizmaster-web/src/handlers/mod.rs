//! Route handlers, one module per area of the site.
//!
//! Every handler starts from a role gate extractor, performs its store
//! work, and answers with a page or a redirect. Form problems are shown on
//! the form that caused them instead of on an error page.

pub mod admin;
pub mod chapters;
pub mod member;
pub mod public;
pub mod questions;
pub mod quizzes;
pub mod report;
pub mod subjects;

use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::{
  error::Error,
  session::{FlashLevel, Session},
};

/// Answer a form problem by showing the form again with the status the
/// problem maps to.
pub(crate) fn rerender(problem: &Error, page: Html<String>) -> Response {
  (problem.status(), page).into_response()
}

/// Queue a success message and send the browser to `to`.
pub(crate) fn done(session: &Session, message: impl Into<String>, to: &str) -> Response {
  session.flash(FlashLevel::Success, message);
  Redirect::to(to).into_response()
}
