//! The quiz catalog: subjects, chapters, quizzes and their questions.
//!
//! The hierarchy is strict. Every chapter belongs to a subject, every quiz to
//! a chapter, every question to a quiz. Removing a node removes everything
//! beneath it, including the scores recorded against removed quizzes.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Subject ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSubject {
  pub name:        String,
  pub description: Option<String>,
}

// ─── Chapter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub subject_id:  i64,
}

#[derive(Debug, Clone)]
pub struct NewChapter {
  pub name:        String,
  pub description: Option<String>,
  pub subject_id:  i64,
}

// ─── Quiz ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
  pub id:         i64,
  pub title:      String,
  pub chapter_id: i64,
  /// The day the quiz is scheduled for, if any.
  pub date:       Option<NaiveDate>,
  /// Time allowed, in minutes.
  pub duration:   Option<u32>,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
  pub title:      String,
  pub chapter_id: i64,
  pub date:       Option<NaiveDate>,
  pub duration:   Option<u32>,
}

// ─── Question ────────────────────────────────────────────────────────────────

/// One of the four answer slots of a question, numbered 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct OptionSlot(u8);

impl OptionSlot {
  pub const ALL: [OptionSlot; 4] =
    [OptionSlot(1), OptionSlot(2), OptionSlot(3), OptionSlot(4)];

  pub fn get(self) -> u8 { self.0 }

  /// Parse a submitted form value. Anything that is not `1`..=`4` yields
  /// `None`.
  pub fn parse(value: &str) -> Option<Self> {
    value
      .trim()
      .parse::<i64>()
      .ok()
      .and_then(|n| Self::try_from(n).ok())
  }
}

impl TryFrom<i64> for OptionSlot {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    match value {
      1..=4 => Ok(OptionSlot(value as u8)),
      other => Err(Error::InvalidOption(other)),
    }
  }
}

impl From<OptionSlot> for i64 {
  fn from(slot: OptionSlot) -> Self { i64::from(slot.0) }
}

impl fmt::Display for OptionSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id:             i64,
  pub quiz_id:        i64,
  pub statement:      String,
  pub options:        [String; 4],
  pub correct_option: OptionSlot,
}

impl Question {
  /// Text of the given answer slot.
  pub fn option(&self, slot: OptionSlot) -> &str {
    &self.options[usize::from(slot.get() - 1)]
  }
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
  pub quiz_id:        i64,
  pub statement:      String,
  pub options:        [String; 4],
  pub correct_option: OptionSlot,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn option_slot_accepts_one_to_four() {
    for n in 1..=4 {
      assert_eq!(OptionSlot::try_from(n).unwrap().get() as i64, n);
    }
  }

  #[test]
  fn option_slot_rejects_out_of_range() {
    assert_eq!(OptionSlot::try_from(0), Err(Error::InvalidOption(0)));
    assert_eq!(OptionSlot::try_from(5), Err(Error::InvalidOption(5)));
    assert_eq!(OptionSlot::try_from(-1), Err(Error::InvalidOption(-1)));
  }

  #[test]
  fn option_slot_parses_form_values() {
    assert_eq!(OptionSlot::parse("2"), Some(OptionSlot(2)));
    assert_eq!(OptionSlot::parse(" 4 "), Some(OptionSlot(4)));
    assert_eq!(OptionSlot::parse(""), None);
    assert_eq!(OptionSlot::parse("two"), None);
    assert_eq!(OptionSlot::parse("7"), None);
  }

  #[test]
  fn question_option_indexes_from_one() {
    let q = Question {
      id:             1,
      quiz_id:        1,
      statement:      "2 + 2?".into(),
      options:        ["3".into(), "4".into(), "5".into(), "22".into()],
      correct_option: OptionSlot(2),
    };
    assert_eq!(q.option(q.correct_option), "4");
    assert_eq!(q.option(OptionSlot::ALL[3]), "22");
  }
}
