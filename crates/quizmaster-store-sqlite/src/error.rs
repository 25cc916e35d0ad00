//! Error type for `quizmaster-store-sqlite`.

use quizmaster_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The data model refused the write (duplicate key, unknown parent, ...).
  #[error(transparent)]
  Core(#[from] quizmaster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),
}

impl StoreError for Error {
  fn into_rejection(self) -> Result<quizmaster_core::Error, Self> {
    match self {
      Error::Core(e) => Ok(e),
      other => Err(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
