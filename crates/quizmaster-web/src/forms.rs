//! Submitted form bodies and their validation.
//!
//! Every field arrives as a string (missing fields deserialize as empty) so
//! that a half-filled form can be shown back to the user unchanged. The
//! `validate` methods turn a form into the typed input the store expects.

use chrono::NaiveDate;
use quizmaster_core::{
  account::{Profile, User},
  catalog::{NewChapter, NewQuestion, NewQuiz, NewSubject, OptionSlot},
};
use serde::Deserialize;

use crate::error::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Field helpers ───────────────────────────────────────────────────────────

fn required(field: &'static str, value: &str) -> Result<String, Error> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(value.to_owned())
}

fn optional(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_owned())
}

fn parse_id(field: &'static str, value: &str) -> Result<i64, Error> {
  required(field, value)?
    .parse()
    .map_err(|_| Error::InvalidField {
      field,
      message: format!("{field} must be a whole number"),
    })
}

fn parse_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, Error> {
  optional(value)
    .map(|v| NaiveDate::parse_from_str(&v, DATE_FORMAT))
    .transpose()
    .map_err(|_| Error::InvalidField {
      field,
      message: format!("{field} must be a date like 2024-01-31"),
    })
}

fn parse_minutes(field: &'static str, value: &str) -> Result<Option<u32>, Error> {
  optional(value)
    .map(|v| v.parse::<u32>())
    .transpose()
    .map_err(|_| Error::InvalidField {
      field,
      message: format!("{field} must be a number of minutes"),
    })
}

fn format_date(date: Option<NaiveDate>) -> String {
  date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
  pub username:      String,
  pub password:      String,
  pub full_name:     String,
  pub qualification: String,
  pub dob:           String,
}

/// A validated registration; the password is still in the clear.
pub struct Registration {
  pub username: String,
  pub password: String,
  pub profile:  Profile,
}

impl RegisterForm {
  pub fn validate(&self) -> Result<Registration, Error> {
    Ok(Registration {
      username: required("username", &self.username)?,
      password: required("password", &self.password)?,
      profile:  Profile {
        full_name:     optional(&self.full_name),
        qualification: optional(&self.qualification),
        dob:           parse_date("dob", &self.dob)?,
      },
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

impl LoginForm {
  pub fn validate(&self) -> Result<(String, String), Error> {
    Ok((
      required("username", &self.username)?,
      required("password", &self.password)?,
    ))
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
  pub full_name:     String,
  pub qualification: String,
  pub dob:           String,
}

impl ProfileForm {
  pub fn validate(&self) -> Result<Profile, Error> {
    Ok(Profile {
      full_name:     optional(&self.full_name),
      qualification: optional(&self.qualification),
      dob:           parse_date("dob", &self.dob)?,
    })
  }
}

impl From<&User> for ProfileForm {
  fn from(user: &User) -> Self {
    ProfileForm {
      full_name:     user.full_name.clone().unwrap_or_default(),
      qualification: user.qualification.clone().unwrap_or_default(),
      dob:           format_date(user.dob),
    }
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubjectForm {
  pub name:        String,
  pub description: String,
}

impl SubjectForm {
  pub fn validate(&self) -> Result<NewSubject, Error> {
    Ok(NewSubject {
      name:        required("name", &self.name)?,
      description: optional(&self.description),
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChapterForm {
  pub name:        String,
  pub description: String,
  pub subject_id:  String,
}

impl ChapterForm {
  pub fn validate(&self) -> Result<NewChapter, Error> {
    Ok(NewChapter {
      name:        required("name", &self.name)?,
      description: optional(&self.description),
      subject_id:  parse_id("subject_id", &self.subject_id)?,
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuizForm {
  pub title:      String,
  pub chapter_id: String,
  pub date:       String,
  pub duration:   String,
}

impl QuizForm {
  pub fn validate(&self) -> Result<NewQuiz, Error> {
    Ok(NewQuiz {
      title:      required("title", &self.title)?,
      chapter_id: parse_id("chapter_id", &self.chapter_id)?,
      date:       parse_date("date", &self.date)?,
      duration:   parse_minutes("duration", &self.duration)?,
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuestionForm {
  pub quiz_id:        String,
  pub statement:      String,
  pub option1:        String,
  pub option2:        String,
  pub option3:        String,
  pub option4:        String,
  pub correct_option: String,
}

impl QuestionForm {
  pub fn validate(&self) -> Result<NewQuestion, Error> {
    let quiz_id = parse_id("quiz_id", &self.quiz_id)?;
    let statement = required("statement", &self.statement)?;
    let options = [
      required("option1", &self.option1)?,
      required("option2", &self.option2)?,
      required("option3", &self.option3)?,
      required("option4", &self.option4)?,
    ];
    let correct_option = OptionSlot::try_from(parse_id(
      "correct_option",
      &self.correct_option,
    )?)?;
    Ok(NewQuestion { quiz_id, statement, options, correct_option })
  }

  /// Submitted text of option `n` (1-based).
  pub fn option(&self, n: u8) -> &str {
    match n {
      1 => &self.option1,
      2 => &self.option2,
      3 => &self.option3,
      _ => &self.option4,
    }
  }
}
