//! Domain rejections shared by every store backend.

use thiserror::Error;

/// A write the data model refuses. These are user-recoverable: the web
/// layer shows them back on the form that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("{field} {value:?} is already taken")]
  Duplicate { field: &'static str, value: String },

  #[error("{field} {id} does not exist")]
  MissingParent { field: &'static str, id: i64 },

  #[error("option {0} is not one of the four answer slots")]
  InvalidOption(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
