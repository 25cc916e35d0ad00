//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339 strings,
//! roles as their lowercase names.

use std::os::raw::c_int;

use chrono::{DateTime, NaiveDate, Utc};
use quizmaster_core::{
  account::{Credentials, Role, User},
  attempt::{Attempt, Score},
  catalog::{Chapter, OptionSlot, Question, Quiz, Subject},
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str { r.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "user" => Ok(Role::User),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── Constraint failures ─────────────────────────────────────────────────────

/// Which schema constraint a failed statement tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
  Unique,
  ForeignKey,
  Check,
}

/// Classify `e` if it is a constraint failure.
pub fn violation(e: &tokio_rusqlite::Error) -> Option<Violation> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _)) = e
  else {
    return None;
  };
  if failure.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }
  let code: c_int = failure.extended_code;
  match code {
    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(Violation::Unique),
    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
    rusqlite::ffi::SQLITE_CONSTRAINT_CHECK => Some(Violation::Check),
    _ => None,
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────
//
// Each `Raw*` struct is read inside a `tokio_rusqlite` closure and decoded
// into its domain type once back on the async side.

pub const USER_COLUMNS: &str =
  "id, username, full_name, qualification, dob, role";

pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub full_name:     Option<String>,
  pub qualification: Option<String>,
  pub dob:           Option<String>,
  pub role:          String,
}

impl RawUser {
  /// Reads [`USER_COLUMNS`] starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawUser {
      id:            row.get(0)?,
      username:      row.get(1)?,
      full_name:     row.get(2)?,
      qualification: row.get(3)?,
      dob:           row.get(4)?,
      role:          row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      full_name:     self.full_name,
      qualification: self.qualification,
      dob:           self.dob.as_deref().map(decode_date).transpose()?,
      role:          decode_role(&self.role)?,
    })
  }
}

pub struct RawCredentials {
  pub user:          RawUser,
  pub password_hash: String,
}

impl RawCredentials {
  /// Reads [`USER_COLUMNS`] followed by `password_hash`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawCredentials {
      user:          RawUser::from_row(row)?,
      password_hash: row.get(6)?,
    })
  }

  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      user:          self.user.into_user()?,
      password_hash: self.password_hash,
    })
  }
}

pub const SUBJECT_COLUMNS: &str = "id, name, description";

pub fn subject_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
  })
}

pub const CHAPTER_COLUMNS: &str = "id, name, description, subject_id";

pub fn chapter_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chapter> {
  Ok(Chapter {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    subject_id:  row.get(3)?,
  })
}

pub const QUIZ_COLUMNS: &str = "id, title, chapter_id, date, duration";

pub struct RawQuiz {
  pub id:         i64,
  pub title:      String,
  pub chapter_id: i64,
  pub date:       Option<String>,
  pub duration:   Option<u32>,
}

impl RawQuiz {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawQuiz {
      id:         row.get(0)?,
      title:      row.get(1)?,
      chapter_id: row.get(2)?,
      date:       row.get(3)?,
      duration:   row.get(4)?,
    })
  }

  pub fn into_quiz(self) -> Result<Quiz> {
    Ok(Quiz {
      id:         self.id,
      title:      self.title,
      chapter_id: self.chapter_id,
      date:       self.date.as_deref().map(decode_date).transpose()?,
      duration:   self.duration,
    })
  }
}

pub const QUESTION_COLUMNS: &str =
  "id, quiz_id, statement, option1, option2, option3, option4, correct_option";

pub struct RawQuestion {
  pub id:             i64,
  pub quiz_id:        i64,
  pub statement:      String,
  pub options:        [String; 4],
  pub correct_option: i64,
}

impl RawQuestion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawQuestion {
      id:             row.get(0)?,
      quiz_id:        row.get(1)?,
      statement:      row.get(2)?,
      options:        [row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?],
      correct_option: row.get(7)?,
    })
  }

  /// Only fails if a row slipped past the `CHECK` on `correct_option`.
  pub fn into_question(self) -> quizmaster_core::Result<Question> {
    Ok(Question {
      id:             self.id,
      quiz_id:        self.quiz_id,
      statement:      self.statement,
      options:        self.options,
      correct_option: OptionSlot::try_from(self.correct_option)?,
    })
  }
}

pub struct RawAttempt {
  pub id:         i64,
  pub user_id:    i64,
  pub quiz_id:    i64,
  pub score:      u32,
  pub date:       String,
  pub quiz_title: String,
}

impl RawAttempt {
  /// Reads `s.id, s.user_id, s.quiz_id, s.score, s.date, q.title`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawAttempt {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      quiz_id:    row.get(2)?,
      score:      row.get(3)?,
      date:       row.get(4)?,
      quiz_title: row.get(5)?,
    })
  }

  pub fn into_attempt(self) -> Result<Attempt> {
    Ok(Attempt {
      score:      Score {
        id:      self.id,
        user_id: self.user_id,
        quiz_id: self.quiz_id,
        score:   self.score,
        date:    decode_dt(&self.date)?,
      },
      quiz_title: self.quiz_title,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_use_iso_calendar_format() {
    let d = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
    assert_eq!(encode_date(d), "1980-01-01");
    assert_eq!(decode_date("1980-01-01").unwrap(), d);
    assert!(matches!(decode_date("01/01/1980"), Err(Error::DateParse(_))));
  }

  #[test]
  fn roles_decode_from_lowercase_names() {
    assert_eq!(decode_role(encode_role(Role::Admin)).unwrap(), Role::Admin);
    assert_eq!(decode_role("user").unwrap(), Role::User);
    assert!(matches!(decode_role("root"), Err(Error::UnknownRole(_))));
  }
}
