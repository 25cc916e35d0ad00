//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use quizmaster_core::store::StoreError;
use thiserror::Error;

use crate::views;

#[derive(Debug, Error)]
pub enum Error {
  /// The role gate refused the request. The gate has already queued a flash
  /// message explaining why.
  #[error("unauthorized")]
  Unauthorized,
  #[error("not found")]
  NotFound,
  #[error("{0} is required")]
  MissingField(&'static str),
  #[error("{message}")]
  InvalidField { field: &'static str, message: String },
  #[error("{message}")]
  Conflict { field: &'static str, message: String },
  #[error("internal error: {0}")]
  Internal(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a store failure, surfacing data-model rejections as form problems.
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.into_rejection() {
      Ok(rejection) => rejection.into(),
      Err(e) => Error::Store(Box::new(e)),
    }
  }

  /// Whether the error is about user input and belongs next to the form
  /// that produced it.
  pub fn is_form_problem(&self) -> bool {
    matches!(
      self,
      Error::MissingField(_) | Error::InvalidField { .. } | Error::Conflict { .. }
    )
  }

  /// The offending form field, for form problems.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Error::MissingField(field)
      | Error::InvalidField { field, .. }
      | Error::Conflict { field, .. } => Some(*field),
      _ => None,
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::Unauthorized => StatusCode::SEE_OTHER,
      Error::NotFound => StatusCode::NOT_FOUND,
      Error::MissingField(_) | Error::InvalidField { .. } => StatusCode::BAD_REQUEST,
      Error::Conflict { .. } => StatusCode::CONFLICT,
      Error::Internal(_) | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<quizmaster_core::Error> for Error {
  fn from(e: quizmaster_core::Error) -> Self {
    use quizmaster_core::Error as Rejection;
    let message = e.to_string();
    match e {
      Rejection::Duplicate { field, .. } => Error::Conflict { field, message },
      Rejection::MissingParent { field, .. } => Error::InvalidField { field, message },
      Rejection::InvalidOption(_) => Error::InvalidField { field: "correct_option", message },
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      Error::Unauthorized => return Redirect::to("/login").into_response(),
      Error::NotFound => "The page you asked for does not exist.".to_owned(),
      Error::Internal(_) | Error::Store(_) => {
        tracing::error!(error = %self, "request failed");
        "Something went wrong on our side.".to_owned()
      }
      problem => problem.to_string(),
    };
    (status, views::error_page(status, &message)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::header;

  #[test]
  fn rejections_map_to_form_problems() {
    let dup: Error = quizmaster_core::Error::Duplicate {
      field: "username",
      value: "a@b.com".into(),
    }
    .into();
    assert!(dup.is_form_problem());
    assert_eq!(dup.field(), Some("username"));
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let orphan: Error =
      quizmaster_core::Error::MissingParent { field: "quiz_id", id: 9 }.into();
    assert_eq!(orphan.status(), StatusCode::BAD_REQUEST);
    assert_eq!(orphan.field(), Some("quiz_id"));

    let slot: Error = quizmaster_core::Error::InvalidOption(5).into();
    assert_eq!(slot.field(), Some("correct_option"));
  }

  #[test]
  fn unauthorized_redirects_to_login() {
    let res = Error::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");
  }

  #[test]
  fn missing_field_is_bad_request() {
    let err = Error::MissingField("name");
    assert_eq!(err.to_string(), "name is required");
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn not_found_is_404() {
    assert!(!Error::NotFound.is_form_problem());
    assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
  }
}
