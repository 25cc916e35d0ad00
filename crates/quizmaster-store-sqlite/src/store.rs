//! [`SqliteStore`]: the SQLite implementation of [`QuizStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use quizmaster_core::{
  Error as Rejection,
  account::{Credentials, NewUser, Profile, User},
  attempt::{Answers, Attempt, GradedAttempt, Score, SubjectStats},
  catalog::{
    Chapter, NewChapter, NewQuestion, NewQuiz, NewSubject, Question, Quiz,
    Subject,
  },
  grade,
  store::QuizStore,
};

use crate::{
  Error, Result,
  encode::{
    CHAPTER_COLUMNS, QUESTION_COLUMNS, QUIZ_COLUMNS, RawAttempt,
    RawCredentials, RawQuestion, RawQuiz, RawUser, SUBJECT_COLUMNS,
    USER_COLUMNS, Violation, chapter_from_row, encode_date, encode_dt,
    encode_role, subject_from_row, violation,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quiz Master store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete one row of `table`. Child rows go with it through
  /// `ON DELETE CASCADE`, inside the same transaction.
  async fn delete_row(&self, table: &'static str, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          &format!("DELETE FROM {table} WHERE id = ?1"),
          rusqlite::params![id],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    Ok(deleted > 0)
  }

  /// Insert a user row, returning its id and whether a row was written.
  /// With `or_ignore`, an existing username is left alone instead of
  /// failing.
  async fn insert_user(&self, input: &NewUser, or_ignore: bool) -> Result<Option<i64>> {
    let username      = input.username.clone();
    let password_hash = input.password_hash.clone();
    let full_name     = input.full_name.clone();
    let qualification = input.qualification.clone();
    let dob           = input.dob.map(encode_date);
    let role          = encode_role(input.role);

    let conflict = if or_ignore { "ON CONFLICT(username) DO NOTHING" } else { "" };

    self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          &format!(
            "INSERT INTO users (username, password_hash, full_name, qualification, dob, role)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) {conflict}"
          ),
          rusqlite::params![username, password_hash, full_name, qualification, dob, role],
        )?;
        Ok((n > 0).then(|| conn.last_insert_rowid()))
      })
      .await
      .map_err(|e| match violation(&e) {
        Some(Violation::Unique) => Error::Core(Rejection::Duplicate {
          field: "username",
          value: input.username.clone(),
        }),
        _ => e.into(),
      })
  }
}

fn user_from(id: i64, input: NewUser) -> User {
  User {
    id,
    username:      input.username,
    full_name:     input.full_name,
    qualification: input.qualification,
    dob:           input.dob,
    role:          input.role,
  }
}

/// Map a dangling-reference failure on `field` to a domain rejection.
fn missing_parent(e: tokio_rusqlite::Error, field: &'static str, id: i64) -> Error {
  match violation(&e) {
    Some(Violation::ForeignKey) => Error::Core(Rejection::MissingParent { field, id }),
    _ => e.into(),
  }
}

// ─── QuizStore impl ──────────────────────────────────────────────────────────

impl QuizStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let id = self
      .insert_user(&input, false)
      .await?
      .ok_or_else(|| Rejection::Duplicate {
        field: "username",
        value: input.username.clone(),
      })?;
    Ok(user_from(id, input))
  }

  async fn ensure_user(&self, input: NewUser) -> Result<Option<User>> {
    let id = self.insert_user(&input, true).await?;
    Ok(id.map(|id| user_from(id, input)))
  }

  async fn find_credentials(&self, username: String) -> Result<Option<Credentials>> {
    let raw: Option<RawCredentials> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"),
              rusqlite::params![username],
              RawCredentials::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCredentials::into_credentials).transpose()
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
              rusqlite::params![id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn update_profile(&self, id: i64, profile: Profile) -> Result<Option<User>> {
    let dob = profile.dob.map(encode_date);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET full_name = ?2, qualification = ?3, dob = ?4 WHERE id = ?1",
          rusqlite::params![id, profile.full_name, profile.qualification, dob],
        )?)
      })
      .await?;

    if updated == 0 {
      return Ok(None);
    }
    self.get_user(id).await
  }

  async fn delete_user(&self, id: i64) -> Result<bool> {
    self.delete_row("users", id).await
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn create_subject(&self, input: NewSubject) -> Result<Subject> {
    let name        = input.name.clone();
    let description = input.description.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (name, description) VALUES (?1, ?2)",
          rusqlite::params![name, description],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| match violation(&e) {
        Some(Violation::Unique) => Error::Core(Rejection::Duplicate {
          field: "name",
          value: input.name.clone(),
        }),
        _ => e.into(),
      })?;

    Ok(Subject { id, name: input.name, description: input.description })
  }

  async fn get_subject(&self, id: i64) -> Result<Option<Subject>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
                rusqlite::params![id],
                subject_from_row,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt =
            conn.prepare(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY id"))?;
          let rows = stmt
            .query_map([], subject_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn delete_subject(&self, id: i64) -> Result<bool> {
    self.delete_row("subjects", id).await
  }

  // ── Chapters ──────────────────────────────────────────────────────────────

  async fn create_chapter(&self, input: NewChapter) -> Result<Chapter> {
    let name        = input.name.clone();
    let description = input.description.clone();
    let subject_id  = input.subject_id;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chapters (name, description, subject_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, description, subject_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| missing_parent(e, "subject_id", subject_id))?;

    Ok(Chapter {
      id,
      name: input.name,
      description: input.description,
      subject_id,
    })
  }

  async fn get_chapter(&self, id: i64) -> Result<Option<Chapter>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = ?1"),
                rusqlite::params![id],
                chapter_from_row,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn list_chapters(&self, subject_id: Option<i64>) -> Result<Vec<Chapter>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters
             WHERE ?1 IS NULL OR subject_id = ?1
             ORDER BY id"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![subject_id], chapter_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn delete_chapter(&self, id: i64) -> Result<bool> {
    self.delete_row("chapters", id).await
  }

  // ── Quizzes ───────────────────────────────────────────────────────────────

  async fn create_quiz(&self, input: NewQuiz) -> Result<Quiz> {
    let title      = input.title.clone();
    let chapter_id = input.chapter_id;
    let date       = input.date.map(encode_date);
    let duration   = input.duration;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO quizzes (title, chapter_id, date, duration) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![title, chapter_id, date, duration],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| missing_parent(e, "chapter_id", chapter_id))?;

    Ok(Quiz {
      id,
      title: input.title,
      chapter_id,
      date: input.date,
      duration: input.duration,
    })
  }

  async fn get_quiz(&self, id: i64) -> Result<Option<Quiz>> {
    let raw: Option<RawQuiz> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1"),
              rusqlite::params![id],
              RawQuiz::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawQuiz::into_quiz).transpose()
  }

  async fn list_quizzes(&self, chapter_id: Option<i64>) -> Result<Vec<Quiz>> {
    let raws: Vec<RawQuiz> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {QUIZ_COLUMNS} FROM quizzes
           WHERE ?1 IS NULL OR chapter_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![chapter_id], RawQuiz::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQuiz::into_quiz).collect()
  }

  async fn delete_quiz(&self, id: i64) -> Result<bool> {
    self.delete_row("quizzes", id).await
  }

  // ── Questions ─────────────────────────────────────────────────────────────

  async fn create_question(&self, input: NewQuestion) -> Result<Question> {
    let quiz_id   = input.quiz_id;
    let statement = input.statement.clone();
    let [o1, o2, o3, o4] = input.options.clone();
    let correct   = i64::from(input.correct_option);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO questions
             (statement, option1, option2, option3, option4, correct_option, quiz_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![statement, o1, o2, o3, o4, correct, quiz_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| missing_parent(e, "quiz_id", quiz_id))?;

    Ok(Question {
      id,
      quiz_id,
      statement: input.statement,
      options: input.options,
      correct_option: input.correct_option,
    })
  }

  async fn get_question(&self, id: i64) -> Result<Option<Question>> {
    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
              rusqlite::params![id],
              RawQuestion::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawQuestion::into_question).transpose()?)
  }

  async fn list_questions(&self, quiz_id: Option<i64>) -> Result<Vec<Question>> {
    let raws: Vec<RawQuestion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {QUESTION_COLUMNS} FROM questions
           WHERE ?1 IS NULL OR quiz_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![quiz_id], RawQuestion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .into_iter()
        .map(RawQuestion::into_question)
        .collect::<quizmaster_core::Result<_>>()?,
    )
  }

  async fn delete_question(&self, id: i64) -> Result<bool> {
    self.delete_row("questions", id).await
  }

  // ── Attempts ──────────────────────────────────────────────────────────────

  async fn submit_quiz(
    &self,
    user_id: i64,
    quiz_id: i64,
    answers: Answers,
  ) -> Result<Option<GradedAttempt>> {
    let date     = Utc::now();
    let date_str = encode_dt(date);

    // Reading the questions and inserting the score share one transaction so
    // the tally can never exceed the question count it was graded against.
    let graded: Option<(i64, u32, u32)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM quizzes WHERE id = ?1",
            rusqlite::params![quiz_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let questions = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = ?1"
          ))?;
          stmt
            .query_map(rusqlite::params![quiz_id], RawQuestion::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(RawQuestion::into_question)
            .collect::<quizmaster_core::Result<Vec<_>>>()
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?
        };

        let score = grade(&questions, &answers);
        tx.execute(
          "INSERT INTO scores (user_id, quiz_id, score, date) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id, quiz_id, score, date_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Some((id, score, questions.len() as u32)))
      })
      .await
      .map_err(|e| missing_parent(e, "user_id", user_id))?;

    Ok(graded.map(|(id, score, question_count)| GradedAttempt {
      score: Score { id, user_id, quiz_id, score, date },
      question_count,
    }))
  }

  async fn list_attempts(&self, user_id: i64) -> Result<Vec<Attempt>> {
    let raws: Vec<RawAttempt> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.id, s.user_id, s.quiz_id, s.score, s.date, q.title
           FROM scores s
           JOIN quizzes q ON q.id = s.quiz_id
           WHERE s.user_id = ?1
           ORDER BY s.id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawAttempt::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttempt::into_attempt).collect()
  }

  async fn subject_stats(&self) -> Result<Vec<SubjectStats>> {
    Ok(
      self
        .conn
        .call(|conn| {
          // Inner joins all the way down: a subject with no scores yields no
          // group at all rather than a zero row.
          let mut stmt = conn.prepare(
            "SELECT sub.name, COUNT(sc.id), AVG(sc.score)
             FROM subjects sub
             JOIN chapters c  ON c.subject_id = sub.id
             JOIN quizzes  q  ON q.chapter_id = c.id
             JOIN scores   sc ON sc.quiz_id   = q.id
             GROUP BY sub.name
             ORDER BY sub.name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(SubjectStats {
                subject:       row.get(0)?,
                attempts:      row.get::<_, i64>(1)? as u64,
                average_score: row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }
}
