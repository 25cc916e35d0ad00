//! Administrator pages for subjects, chapters, quizzes and questions.

use axum::response::Html;
use quizmaster_core::catalog::{Chapter, OptionSlot, Question, Quiz, Subject};

use super::{
  Cell, Chrome, Document, Problem, form_close, form_open, input,
  member::{quiz_date, quiz_duration},
  page, select, table, textarea,
};
use crate::forms::{ChapterForm, QuestionForm, QuizForm, SubjectForm};

/// Heading, "new" link and table for a list page.
fn listing(
  doc: &mut Document,
  new_href: &str,
  headers: &[&str],
  rows: Vec<Vec<Cell>>,
) {
  doc.open("p", &[]).link(new_href, "Add new").close("p");
  table(doc, headers, rows, "Nothing here yet.");
}

fn detail_row(doc: &mut Document, label: &str, value: &str) {
  doc.element("dt", &[], label).element("dd", &[], value);
}

fn lookup<'a, T>(items: &'a [T], id: i64, id_of: impl Fn(&T) -> i64) -> Option<&'a T> {
  items.iter().find(|&item| id_of(item) == id)
}

// ─── Subjects ────────────────────────────────────────────────────────────────

pub fn subjects(chrome: &Chrome, subjects: &[Subject]) -> Html<String> {
  page(chrome, "Subjects", |doc| {
    let rows = subjects
      .iter()
      .map(|s| {
        vec![
          Cell::link(format!("/admin/subjects/{}", s.id), &s.name),
          Cell::text(s.description.as_deref().unwrap_or("")),
          Cell::delete(format!("/admin/subjects/{}/delete", s.id)),
        ]
      })
      .collect();
    listing(doc, "/admin/subjects/new", &["Name", "Description", ""], rows);
  })
}

pub fn subject(chrome: &Chrome, subject: &Subject, chapters: &[Chapter]) -> Html<String> {
  page(chrome, &subject.name, |doc| {
    if let Some(description) = &subject.description {
      doc.element("p", &[], description);
    }
    doc.element("h2", &[], "Chapters");
    let rows = chapters
      .iter()
      .map(|c| vec![Cell::link(format!("/admin/chapters/{}", c.id), &c.name)])
      .collect();
    table(doc, &["Name"], rows, "This subject has no chapters yet.");
    let add = format!("/admin/chapters/new?subject_id={}", subject.id);
    doc.open("p", &[]).link(&add, "Add a chapter").close("p");
  })
}

pub fn subject_form(
  chrome: &Chrome,
  form: &SubjectForm,
  problem: Option<&Problem>,
) -> Html<String> {
  page(chrome, "New subject", |doc| {
    form_open(doc, "/admin/subjects/new", problem);
    input(doc, problem, ("name", "Name"), "text", &form.name, true);
    textarea(doc, problem, ("description", "Description"), &form.description);
    form_close(doc, "Create subject");
  })
}

// ─── Chapters ────────────────────────────────────────────────────────────────

pub fn chapters(
  chrome: &Chrome,
  chapters: &[Chapter],
  subjects: &[Subject],
) -> Html<String> {
  page(chrome, "Chapters", |doc| {
    let rows = chapters
      .iter()
      .map(|c| {
        let subject = lookup(subjects, c.subject_id, |s| s.id)
          .map(|s| s.name.as_str())
          .unwrap_or("");
        vec![
          Cell::link(format!("/admin/chapters/{}", c.id), &c.name),
          Cell::text(subject),
          Cell::text(c.description.as_deref().unwrap_or("")),
          Cell::delete(format!("/admin/chapters/{}/delete", c.id)),
        ]
      })
      .collect();
    listing(
      doc,
      "/admin/chapters/new",
      &["Name", "Subject", "Description", ""],
      rows,
    );
  })
}

pub fn chapter(
  chrome: &Chrome,
  chapter: &Chapter,
  subject: Option<&Subject>,
  quizzes: &[Quiz],
) -> Html<String> {
  page(chrome, &chapter.name, |doc| {
    doc.open("dl", &[]);
    if let Some(subject) = subject {
      detail_row(doc, "Subject", &subject.name);
    }
    detail_row(doc, "Description", chapter.description.as_deref().unwrap_or(""));
    doc.close("dl");

    doc.element("h2", &[], "Quizzes");
    let rows = quizzes
      .iter()
      .map(|q| {
        vec![
          Cell::link(format!("/admin/quizzes/{}", q.id), &q.title),
          Cell::text(quiz_date(q)),
          Cell::text(quiz_duration(q)),
        ]
      })
      .collect();
    table(doc, &["Title", "Date", "Duration"], rows, "This chapter has no quizzes yet.");
    let add = format!("/admin/quizzes/new?chapter_id={}", chapter.id);
    doc.open("p", &[]).link(&add, "Add a quiz").close("p");
  })
}

pub fn chapter_form(
  chrome: &Chrome,
  form: &ChapterForm,
  subjects: &[Subject],
  problem: Option<&Problem>,
) -> Html<String> {
  let choices: Vec<_> = subjects
    .iter()
    .map(|s| (s.id.to_string(), s.name.clone()))
    .collect();
  page(chrome, "New chapter", |doc| {
    form_open(doc, "/admin/chapters/new", problem);
    select(doc, problem, ("subject_id", "Subject"), &choices, &form.subject_id);
    input(doc, problem, ("name", "Name"), "text", &form.name, true);
    textarea(doc, problem, ("description", "Description"), &form.description);
    form_close(doc, "Create chapter");
  })
}

// ─── Quizzes ─────────────────────────────────────────────────────────────────

pub fn quizzes(chrome: &Chrome, quizzes: &[Quiz], chapters: &[Chapter]) -> Html<String> {
  page(chrome, "Quizzes", |doc| {
    let rows = quizzes
      .iter()
      .map(|q| {
        let chapter = lookup(chapters, q.chapter_id, |c| c.id)
          .map(|c| c.name.as_str())
          .unwrap_or("");
        vec![
          Cell::link(format!("/admin/quizzes/{}", q.id), &q.title),
          Cell::text(chapter),
          Cell::text(quiz_date(q)),
          Cell::text(quiz_duration(q)),
          Cell::delete(format!("/admin/quizzes/{}/delete", q.id)),
        ]
      })
      .collect();
    listing(
      doc,
      "/admin/quizzes/new",
      &["Title", "Chapter", "Date", "Duration", ""],
      rows,
    );
  })
}

pub fn quiz(
  chrome: &Chrome,
  quiz: &Quiz,
  chapter: Option<&Chapter>,
  questions: &[Question],
) -> Html<String> {
  page(chrome, &quiz.title, |doc| {
    doc.open("dl", &[]);
    if let Some(chapter) = chapter {
      detail_row(doc, "Chapter", &chapter.name);
    }
    detail_row(doc, "Date", &quiz_date(quiz));
    detail_row(doc, "Duration", &quiz_duration(quiz));
    doc.close("dl");

    doc.element("h2", &[], "Questions");
    let rows = questions
      .iter()
      .map(|q| {
        vec![
          Cell::link(format!("/admin/questions/{}", q.id), &q.statement),
          Cell::text(q.option(q.correct_option)),
        ]
      })
      .collect();
    table(doc, &["Statement", "Correct answer"], rows, "This quiz has no questions yet.");
    let add = format!("/admin/questions/new?quiz_id={}", quiz.id);
    doc.open("p", &[]).link(&add, "Add a question").close("p");
  })
}

pub fn quiz_form(
  chrome: &Chrome,
  form: &QuizForm,
  chapters: &[Chapter],
  problem: Option<&Problem>,
) -> Html<String> {
  let choices: Vec<_> = chapters
    .iter()
    .map(|c| (c.id.to_string(), c.name.clone()))
    .collect();
  page(chrome, "New quiz", |doc| {
    form_open(doc, "/admin/quizzes/new", problem);
    select(doc, problem, ("chapter_id", "Chapter"), &choices, &form.chapter_id);
    input(doc, problem, ("title", "Title"), "text", &form.title, true);
    input(doc, problem, ("date", "Date"), "date", &form.date, false);
    input(doc, problem, ("duration", "Duration (minutes)"), "number", &form.duration, false);
    form_close(doc, "Create quiz");
  })
}

// ─── Questions ───────────────────────────────────────────────────────────────

pub fn questions(chrome: &Chrome, questions: &[Question], quizzes: &[Quiz]) -> Html<String> {
  page(chrome, "Questions", |doc| {
    let rows = questions
      .iter()
      .map(|q| {
        let quiz = lookup(quizzes, q.quiz_id, |z| z.id)
          .map(|z| z.title.as_str())
          .unwrap_or("");
        vec![
          Cell::link(format!("/admin/questions/{}", q.id), &q.statement),
          Cell::text(quiz),
          Cell::text(q.correct_option),
          Cell::delete(format!("/admin/questions/{}/delete", q.id)),
        ]
      })
      .collect();
    listing(
      doc,
      "/admin/questions/new",
      &["Statement", "Quiz", "Correct option", ""],
      rows,
    );
  })
}

pub fn question(chrome: &Chrome, question: &Question, quiz: Option<&Quiz>) -> Html<String> {
  page(chrome, "Question", |doc| {
    doc.element("p", &[], &question.statement);
    doc.open("ol", &[]);
    for slot in OptionSlot::ALL {
      let text = question.option(slot);
      if slot == question.correct_option {
        doc.open("li", &[]).element("strong", &[], text).text(" (correct)").close("li");
      } else {
        doc.element("li", &[], text);
      }
    }
    doc.close("ol");
    if let Some(quiz) = quiz {
      let href = format!("/admin/quizzes/{}", quiz.id);
      doc.open("p", &[]).text("Part of ").link(&href, &quiz.title).close("p");
    }
  })
}

pub fn question_form(
  chrome: &Chrome,
  form: &QuestionForm,
  quizzes: &[Quiz],
  problem: Option<&Problem>,
) -> Html<String> {
  let quiz_choices: Vec<_> = quizzes
    .iter()
    .map(|q| (q.id.to_string(), q.title.clone()))
    .collect();
  let slot_choices: Vec<_> = OptionSlot::ALL
    .iter()
    .map(|s| (s.to_string(), format!("Option {s}")))
    .collect();
  page(chrome, "New question", |doc| {
    form_open(doc, "/admin/questions/new", problem);
    select(doc, problem, ("quiz_id", "Quiz"), &quiz_choices, &form.quiz_id);
    textarea(doc, problem, ("statement", "Statement"), &form.statement);
    for slot in OptionSlot::ALL {
      let name = format!("option{slot}");
      let label = format!("Option {slot}");
      input(doc, problem, (name.as_str(), label.as_str()), "text", form.option(slot.get()), true);
    }
    select(
      doc,
      problem,
      ("correct_option", "Correct option"),
      &slot_choices,
      &form.correct_option,
    );
    form_close(doc, "Create question");
  })
}
