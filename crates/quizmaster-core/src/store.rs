//! The `QuizStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `quizmaster-store-sqlite`). The web layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  account::{Credentials, NewUser, Profile, User},
  attempt::{Answers, Attempt, GradedAttempt, SubjectStats},
  catalog::{
    Chapter, NewChapter, NewQuestion, NewQuiz, NewSubject, Question, Quiz,
    Subject,
  },
};

/// Error type of a [`QuizStore`] backend.
pub trait StoreError: std::error::Error + Send + Sync + Sized + 'static {
  /// Split a rejection by the data model (duplicate key, dangling reference,
  /// bad option slot) from an infrastructure failure, which is handed back
  /// unchanged.
  fn into_rejection(self) -> Result<crate::Error, Self>;
}

/// Abstraction over a Quiz Master store backend.
///
/// Referential integrity and cascading deletes are the backend's job: every
/// `delete_*` removes the whole subtree beneath the row in one atomic unit,
/// or nothing at all. `delete_*` returns `false` if the row did not exist.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait QuizStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Insert `input` unless its username is already registered. Returns the
  /// new account, or `None` if nothing was inserted.
  fn ensure_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_credentials(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Replace the editable profile fields. `None` if the user is gone.
  fn update_profile(
    &self,
    id: i64,
    profile: Profile,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Delete an account and all of its scores.
  fn delete_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  fn create_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn delete_subject(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Chapters ──────────────────────────────────────────────────────────

  fn create_chapter(
    &self,
    input: NewChapter,
  ) -> impl Future<Output = Result<Chapter, Self::Error>> + Send + '_;

  fn get_chapter(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Chapter>, Self::Error>> + Send + '_;

  /// All chapters, or only those of `subject_id`.
  fn list_chapters(
    &self,
    subject_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Chapter>, Self::Error>> + Send + '_;

  fn delete_chapter(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Quizzes ───────────────────────────────────────────────────────────

  fn create_quiz(
    &self,
    input: NewQuiz,
  ) -> impl Future<Output = Result<Quiz, Self::Error>> + Send + '_;

  fn get_quiz(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Quiz>, Self::Error>> + Send + '_;

  /// All quizzes, or only those of `chapter_id`.
  fn list_quizzes(
    &self,
    chapter_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Quiz>, Self::Error>> + Send + '_;

  fn delete_quiz(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Questions ─────────────────────────────────────────────────────────

  fn create_question(
    &self,
    input: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  fn get_question(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// All questions, or only those of `quiz_id`.
  fn list_questions(
    &self,
    quiz_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  fn delete_question(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Attempts ──────────────────────────────────────────────────────────

  /// Grade `answers` against the quiz's current questions and record the
  /// result as a new score row. Repeated submissions add repeated rows.
  /// Returns `None` if the quiz does not exist.
  fn submit_quiz(
    &self,
    user_id: i64,
    quiz_id: i64,
    answers: Answers,
  ) -> impl Future<Output = Result<Option<GradedAttempt>, Self::Error>> + Send + '_;

  /// Every attempt by `user_id`, oldest first.
  fn list_attempts(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<Attempt>, Self::Error>> + Send + '_;

  /// Attempt count and mean score per subject name. Subjects with no
  /// attempts are left out.
  fn subject_stats(
    &self,
  ) -> impl Future<Output = Result<Vec<SubjectStats>, Self::Error>> + Send + '_;
}
