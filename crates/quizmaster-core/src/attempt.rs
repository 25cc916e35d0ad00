//! Quiz attempts: submitted answers, grading, and recorded scores.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{OptionSlot, Question};

/// Form field prefix carrying the chosen slot for one question,
/// e.g. `question_17=2`.
pub const ANSWER_FIELD_PREFIX: &str = "question_";

/// The answers of one submission, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers(HashMap<i64, OptionSlot>);

impl Answers {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, question_id: i64, slot: OptionSlot) {
    self.0.insert(question_id, slot);
  }

  pub fn get(&self, question_id: i64) -> Option<OptionSlot> {
    self.0.get(&question_id).copied()
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Collect answers from url-encoded form pairs. Fields that are not
  /// `question_<id>` and values that are not a valid slot are dropped, which
  /// makes the question count as unanswered.
  pub fn from_form<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut answers = Self::new();
    for (key, value) in pairs {
      let Some(id) = key
        .as_ref()
        .strip_prefix(ANSWER_FIELD_PREFIX)
        .and_then(|id| id.parse::<i64>().ok())
      else {
        continue;
      };
      if let Some(slot) = OptionSlot::parse(value.as_ref()) {
        answers.insert(id, slot);
      }
    }
    answers
  }
}

/// Count the questions whose submitted slot equals the stored correct one.
///
/// Only `questions` are graded; answers for other ids are ignored, so the
/// result never exceeds `questions.len()`.
pub fn grade(questions: &[Question], answers: &Answers) -> u32 {
  questions
    .iter()
    .filter(|q| answers.get(q.id) == Some(q.correct_option))
    .count() as u32
}

/// One completed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
  pub id:      i64,
  pub user_id: i64,
  pub quiz_id: i64,
  /// Number of correctly answered questions.
  pub score:   u32,
  pub date:    DateTime<Utc>,
}

/// The outcome of [`QuizStore::submit_quiz`](crate::store::QuizStore::submit_quiz).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAttempt {
  pub score:          Score,
  /// How many questions the quiz had when it was graded.
  pub question_count: u32,
}

/// A score row joined with the quiz it was taken on, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
  pub score:      Score,
  pub quiz_title: String,
}

/// Per-subject attempt aggregation. Subjects without attempts have no entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStats {
  pub subject:       String,
  pub attempts:      u64,
  pub average_score: f64,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(id: i64, correct: i64) -> Question {
    Question {
      id,
      quiz_id: 1,
      statement: format!("Q{id}"),
      options: ["a".into(), "b".into(), "c".into(), "d".into()],
      correct_option: OptionSlot::try_from(correct).unwrap(),
    }
  }

  #[test]
  fn grade_counts_matching_slots() {
    let questions = vec![question(1, 2), question(2, 4), question(3, 1)];
    let answers = Answers::from_form([
      ("question_1", "2"),
      ("question_2", "3"),
      ("question_3", "1"),
    ]);
    assert_eq!(grade(&questions, &answers), 2);
  }

  #[test]
  fn unanswered_questions_count_as_wrong() {
    let questions = vec![question(1, 2), question(2, 4), question(3, 1)];
    let answers = Answers::from_form([("question_2", "4")]);
    assert_eq!(grade(&questions, &answers), 1);
  }

  #[test]
  fn garbage_values_count_as_wrong() {
    let questions = vec![question(1, 2), question(2, 4)];
    let answers =
      Answers::from_form([("question_1", "two"), ("question_2", "9")]);
    assert!(answers.is_empty());
    assert_eq!(grade(&questions, &answers), 0);
  }

  #[test]
  fn answers_for_foreign_questions_are_ignored() {
    let questions = vec![question(1, 2)];
    let answers = Answers::from_form([
      ("question_1", "2"),
      ("question_99", "1"),
      ("csrf", "whatever"),
    ]);
    assert_eq!(answers.len(), 2);
    assert_eq!(grade(&questions, &answers), 1);
  }

  #[test]
  fn empty_quiz_scores_zero() {
    assert_eq!(grade(&[], &Answers::new()), 0);
  }
}
