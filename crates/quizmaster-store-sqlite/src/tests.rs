//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use quizmaster_core::{
  Error as Rejection,
  account::{NewUser, Profile, Role},
  attempt::Answers,
  catalog::{
    Chapter, NewChapter, NewQuestion, NewQuiz, NewSubject, OptionSlot, Question,
    Quiz, Subject,
  },
  store::QuizStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(username: &str) -> NewUser {
  NewUser {
    username:      username.into(),
    password_hash: "$argon2id$placeholder".into(),
    full_name:     Some("Ada Lovelace".into()),
    qualification: Some("BSc".into()),
    dob:           NaiveDate::from_ymd_opt(1815, 12, 10),
    role:          Role::User,
  }
}

async fn subject(s: &SqliteStore, name: &str) -> Subject {
  s.create_subject(NewSubject { name: name.into(), description: None })
    .await
    .unwrap()
}

async fn chapter(s: &SqliteStore, subject_id: i64, name: &str) -> Chapter {
  s.create_chapter(NewChapter {
    name: name.into(),
    description: Some("intro".into()),
    subject_id,
  })
  .await
  .unwrap()
}

async fn quiz(s: &SqliteStore, chapter_id: i64, title: &str) -> Quiz {
  s.create_quiz(NewQuiz {
    title: title.into(),
    chapter_id,
    date: NaiveDate::from_ymd_opt(2024, 3, 1),
    duration: Some(10),
  })
  .await
  .unwrap()
}

async fn question(s: &SqliteStore, quiz_id: i64, correct: i64) -> Question {
  s.create_question(NewQuestion {
    quiz_id,
    statement: "Pick one".into(),
    options: ["a".into(), "b".into(), "c".into(), "d".into()],
    correct_option: OptionSlot::try_from(correct).unwrap(),
  })
  .await
  .unwrap()
}

fn answer(pairs: &[(i64, i64)]) -> Answers {
  let mut answers = Answers::new();
  for &(id, slot) in pairs {
    answers.insert(id, OptionSlot::try_from(slot).unwrap());
  }
  answers
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();
  assert_eq!(user.role, Role::User);

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched, user);
  assert_eq!(fetched.dob, NaiveDate::from_ymd_opt(1815, 12, 10));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  let first = s.create_user(new_user("a@b.com")).await.unwrap();

  let mut second = new_user("a@b.com");
  second.full_name = Some("Impostor".into());
  let err = s.create_user(second).await.unwrap_err();
  assert!(
    matches!(err, Error::Core(Rejection::Duplicate { field: "username", .. })),
    "got {err:?}"
  );

  let users = s.list_users().await.unwrap();
  assert_eq!(users.len(), 1);
  assert_eq!(users[0], first);
}

#[tokio::test]
async fn find_credentials_returns_hash() {
  let s = store().await;
  s.create_user(new_user("a@b.com")).await.unwrap();

  let creds = s.find_credentials("a@b.com".into()).await.unwrap().unwrap();
  assert_eq!(creds.user.username, "a@b.com");
  assert_eq!(creds.password_hash, "$argon2id$placeholder");

  assert!(s.find_credentials("nobody".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn ensure_user_is_idempotent() {
  let s = store().await;
  let mut admin = new_user("admin@quizmaster.com");
  admin.role = Role::Admin;

  let created = s.ensure_user(admin.clone()).await.unwrap();
  assert!(created.is_some());
  let again = s.ensure_user(admin).await.unwrap();
  assert!(again.is_none());

  let users = s.list_users().await.unwrap();
  assert_eq!(users.len(), 1);
  assert_eq!(users[0].role, Role::Admin);
}

#[tokio::test]
async fn update_profile_replaces_fields() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();

  let updated = s
    .update_profile(user.id, Profile {
      full_name:     Some("Ada King".into()),
      qualification: None,
      dob:           None,
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.full_name.as_deref(), Some("Ada King"));
  assert_eq!(updated.qualification, None);
  assert_eq!(updated.dob, None);
  assert_eq!(updated.username, "a@b.com");

  assert!(s.update_profile(9999, Profile::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_user_removes_their_scores() {
  let s = store().await;
  let alice = s.create_user(new_user("alice@x")).await.unwrap();
  let bob = s.create_user(new_user("bob@x")).await.unwrap();
  let subj = subject(&s, "Math").await;
  let ch = chapter(&s, subj.id, "Algebra").await;
  let qz = quiz(&s, ch.id, "Basics").await;
  let q = question(&s, qz.id, 2).await;

  s.submit_quiz(alice.id, qz.id, answer(&[(q.id, 2)])).await.unwrap();
  s.submit_quiz(bob.id, qz.id, answer(&[(q.id, 1)])).await.unwrap();

  assert!(s.delete_user(alice.id).await.unwrap());
  assert!(s.get_user(alice.id).await.unwrap().is_none());
  assert!(s.list_attempts(alice.id).await.unwrap().is_empty());
  assert_eq!(s.list_attempts(bob.id).await.unwrap().len(), 1);

  assert!(!s.delete_user(alice.id).await.unwrap());
}

#[tokio::test]
async fn deleted_ids_are_never_reissued() {
  let s = store().await;
  let first = s.create_user(new_user("first@x")).await.unwrap();
  let last = s.create_user(new_user("last@x")).await.unwrap();
  assert!(s.delete_user(last.id).await.unwrap());

  let next = s.create_user(new_user("next@x")).await.unwrap();
  assert!(next.id > last.id);
  assert_ne!(next.id, first.id);

  let math = subject(&s, "Math").await;
  assert!(s.delete_subject(math.id).await.unwrap());
  let physics = subject(&s, "Physics").await;
  assert!(physics.id > math.id);
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_subject_name_is_rejected() {
  let s = store().await;
  subject(&s, "Math").await;
  let err = s
    .create_subject(NewSubject { name: "Math".into(), description: Some("again".into()) })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(Rejection::Duplicate { field: "name", .. })));
  assert_eq!(s.list_subjects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn children_require_existing_parents() {
  let s = store().await;

  let err = s
    .create_chapter(NewChapter { name: "Orphan".into(), description: None, subject_id: 42 })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(Rejection::MissingParent { field: "subject_id", id: 42 })
  ));

  let err = s
    .create_quiz(NewQuiz { title: "Orphan".into(), chapter_id: 7, date: None, duration: None })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(Rejection::MissingParent { field: "chapter_id", id: 7 })
  ));

  let err = s
    .create_question(NewQuestion {
      quiz_id: 3,
      statement: "?".into(),
      options: ["a".into(), "b".into(), "c".into(), "d".into()],
      correct_option: OptionSlot::ALL[0],
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(Rejection::MissingParent { field: "quiz_id", id: 3 })
  ));

  assert!(s.list_chapters(None).await.unwrap().is_empty());
  assert!(s.list_quizzes(None).await.unwrap().is_empty());
  assert!(s.list_questions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn catalog_round_trips_through_getters() {
  let s = store().await;
  let subj = subject(&s, "Math").await;
  let ch = chapter(&s, subj.id, "Algebra").await;
  let qz = quiz(&s, ch.id, "Basics").await;
  let q = question(&s, qz.id, 3).await;

  assert_eq!(s.get_subject(subj.id).await.unwrap(), Some(subj.clone()));
  assert_eq!(s.get_chapter(ch.id).await.unwrap(), Some(ch.clone()));
  assert_eq!(s.get_quiz(qz.id).await.unwrap(), Some(qz.clone()));
  assert_eq!(s.get_question(q.id).await.unwrap(), Some(q.clone()));

  assert_eq!(s.list_chapters(Some(subj.id)).await.unwrap(), vec![ch.clone()]);
  assert!(s.list_chapters(Some(subj.id + 1)).await.unwrap().is_empty());
  assert_eq!(s.list_quizzes(Some(ch.id)).await.unwrap(), vec![qz.clone()]);
  assert_eq!(s.list_questions(Some(qz.id)).await.unwrap(), vec![q]);

  assert!(s.get_subject(999).await.unwrap().is_none());
  assert!(s.get_question(999).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_subject_cascades_through_the_tree() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();

  let math = subject(&s, "Math").await;
  let algebra = chapter(&s, math.id, "Algebra").await;
  let geometry = chapter(&s, math.id, "Geometry").await;
  let basics = quiz(&s, algebra.id, "Basics").await;
  let shapes = quiz(&s, geometry.id, "Shapes").await;
  let q1 = question(&s, basics.id, 1).await;
  question(&s, shapes.id, 2).await;
  s.submit_quiz(user.id, basics.id, answer(&[(q1.id, 1)])).await.unwrap();
  s.submit_quiz(user.id, shapes.id, Answers::new()).await.unwrap();

  // An unrelated subtree must survive.
  let art = subject(&s, "Art").await;
  let colour = chapter(&s, art.id, "Colour").await;
  let palette = quiz(&s, colour.id, "Palette").await;
  let q_art = question(&s, palette.id, 4).await;
  s.submit_quiz(user.id, palette.id, answer(&[(q_art.id, 4)])).await.unwrap();

  assert!(s.delete_subject(math.id).await.unwrap());

  assert!(s.get_subject(math.id).await.unwrap().is_none());
  assert_eq!(s.list_chapters(None).await.unwrap(), vec![colour]);
  assert_eq!(s.list_quizzes(None).await.unwrap(), vec![palette.clone()]);
  assert_eq!(s.list_questions(None).await.unwrap(), vec![q_art]);

  let attempts = s.list_attempts(user.id).await.unwrap();
  assert_eq!(attempts.len(), 1);
  assert_eq!(attempts[0].score.quiz_id, palette.id);
}

#[tokio::test]
async fn deleting_chapter_and_quiz_cascade() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();
  let math = subject(&s, "Math").await;
  let algebra = chapter(&s, math.id, "Algebra").await;
  let basics = quiz(&s, algebra.id, "Basics").await;
  let advanced = quiz(&s, algebra.id, "Advanced").await;
  question(&s, basics.id, 1).await;
  question(&s, advanced.id, 1).await;
  s.submit_quiz(user.id, basics.id, Answers::new()).await.unwrap();
  s.submit_quiz(user.id, advanced.id, Answers::new()).await.unwrap();

  assert!(s.delete_quiz(basics.id).await.unwrap());
  assert_eq!(s.list_quizzes(None).await.unwrap(), vec![advanced.clone()]);
  assert_eq!(s.list_questions(None).await.unwrap().len(), 1);
  assert_eq!(s.list_attempts(user.id).await.unwrap().len(), 1);

  assert!(s.delete_chapter(algebra.id).await.unwrap());
  assert!(s.list_quizzes(None).await.unwrap().is_empty());
  assert!(s.list_questions(None).await.unwrap().is_empty());
  assert!(s.list_attempts(user.id).await.unwrap().is_empty());
  assert_eq!(s.list_subjects().await.unwrap(), vec![math]);
}

#[tokio::test]
async fn deleting_question_leaves_quiz() {
  let s = store().await;
  let math = subject(&s, "Math").await;
  let algebra = chapter(&s, math.id, "Algebra").await;
  let basics = quiz(&s, algebra.id, "Basics").await;
  let q = question(&s, basics.id, 1).await;

  assert!(s.delete_question(q.id).await.unwrap());
  assert!(!s.delete_question(q.id).await.unwrap());
  assert!(s.get_quiz(basics.id).await.unwrap().is_some());
}

// ─── Attempts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_scores_correct_answers_only() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();
  let math = subject(&s, "Math").await;
  let algebra = chapter(&s, math.id, "Algebra").await;
  let basics = quiz(&s, algebra.id, "Basics").await;
  let q1 = question(&s, basics.id, 1).await;
  let q2 = question(&s, basics.id, 2).await;
  let q3 = question(&s, basics.id, 3).await;
  question(&s, basics.id, 4).await;

  // Two right, one wrong, one blank.
  let graded = s
    .submit_quiz(user.id, basics.id, answer(&[(q1.id, 1), (q2.id, 2), (q3.id, 4)]))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(graded.score.score, 2);
  assert_eq!(graded.question_count, 4);
  assert_eq!(graded.score.user_id, user.id);

  let attempts = s.list_attempts(user.id).await.unwrap();
  assert_eq!(attempts.len(), 1);
  assert_eq!(attempts[0].score, graded.score);
  assert_eq!(attempts[0].quiz_title, "Basics");
}

#[tokio::test]
async fn resubmission_adds_a_row() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();
  let math = subject(&s, "Math").await;
  let algebra = chapter(&s, math.id, "Algebra").await;
  let basics = quiz(&s, algebra.id, "Basics").await;
  let q = question(&s, basics.id, 2).await;

  let first = s.submit_quiz(user.id, basics.id, answer(&[(q.id, 1)])).await.unwrap().unwrap();
  let second = s.submit_quiz(user.id, basics.id, answer(&[(q.id, 2)])).await.unwrap().unwrap();
  assert_ne!(first.score.id, second.score.id);

  let attempts = s.list_attempts(user.id).await.unwrap();
  let scores: Vec<u32> = attempts.iter().map(|a| a.score.score).collect();
  assert_eq!(scores, vec![0, 1]);
}

#[tokio::test]
async fn submit_to_missing_quiz_records_nothing() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();
  assert!(s.submit_quiz(user.id, 404, Answers::new()).await.unwrap().is_none());
  assert!(s.list_attempts(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn subject_stats_skips_subjects_without_attempts() {
  let s = store().await;
  let user = s.create_user(new_user("a@b.com")).await.unwrap();

  let math = subject(&s, "Math").await;
  let algebra = chapter(&s, math.id, "Algebra").await;
  let basics = quiz(&s, algebra.id, "Basics").await;
  let mut qs = Vec::new();
  for _ in 0..5 {
    qs.push(question(&s, basics.id, 1).await);
  }
  let three: Vec<(i64, i64)> = qs.iter().take(3).map(|q| (q.id, 1)).collect();
  let five: Vec<(i64, i64)> = qs.iter().map(|q| (q.id, 1)).collect();
  s.submit_quiz(user.id, basics.id, answer(&three)).await.unwrap();
  s.submit_quiz(user.id, basics.id, answer(&five)).await.unwrap();

  // Has a quiz but nobody took it.
  let art = subject(&s, "Art").await;
  let colour = chapter(&s, art.id, "Colour").await;
  quiz(&s, colour.id, "Palette").await;

  let stats = s.subject_stats().await.unwrap();
  assert_eq!(stats.len(), 1);
  assert_eq!(stats[0].subject, "Math");
  assert_eq!(stats[0].attempts, 2);
  assert!((stats[0].average_score - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn schema_init_is_idempotent_on_reopen() {
  let dir = std::env::temp_dir().join(format!("quizmaster-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("reopen.db");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    subject(&s, "Math").await;
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.list_subjects().await.unwrap().len(), 1);

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
