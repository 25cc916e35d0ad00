//! SQL schema for the Quiz Master SQLite store.
//!
//! Executed once at connection startup. The schema version is recorded in
//! `PRAGMA user_version`; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `foreign_keys` is a per-connection setting, so it must run on every open.
/// Every child table cascades on parent deletion. Ids are `AUTOINCREMENT` so
/// a deleted row's id is never handed out again.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE,
    password_hash  TEXT NOT NULL,          -- argon2 PHC string
    full_name      TEXT,
    qualification  TEXT,
    dob            TEXT,                   -- YYYY-MM-DD
    role           TEXT NOT NULL DEFAULT 'user'
                   CHECK (role IN ('admin', 'user'))
);

CREATE TABLE IF NOT EXISTS subjects (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT
);

CREATE TABLE IF NOT EXISTS chapters (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    description  TEXT,
    subject_id   INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS quizzes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    chapter_id   INTEGER NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
    date         TEXT,                     -- YYYY-MM-DD
    duration     INTEGER CHECK (duration >= 0)  -- minutes
);

CREATE TABLE IF NOT EXISTS questions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    statement       TEXT NOT NULL,
    option1         TEXT NOT NULL,
    option2         TEXT NOT NULL,
    option3         TEXT NOT NULL,
    option4         TEXT NOT NULL,
    correct_option  INTEGER NOT NULL CHECK (correct_option BETWEEN 1 AND 4),
    quiz_id         INTEGER NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE
);

-- One row per submission; resubmitting adds another row.
CREATE TABLE IF NOT EXISTS scores (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id  INTEGER NOT NULL REFERENCES users(id)   ON DELETE CASCADE,
    quiz_id  INTEGER NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
    score    INTEGER NOT NULL CHECK (score >= 0),
    date     TEXT NOT NULL                 -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS chapters_subject_idx ON chapters(subject_id);
CREATE INDEX IF NOT EXISTS quizzes_chapter_idx  ON quizzes(chapter_id);
CREATE INDEX IF NOT EXISTS questions_quiz_idx   ON questions(quiz_id);
CREATE INDEX IF NOT EXISTS scores_user_idx      ON scores(user_id);
CREATE INDEX IF NOT EXISTS scores_quiz_idx      ON scores(quiz_id);

PRAGMA user_version = 1;
";
