//! Pages for signed-in users: dashboard, profile and quiz taking.

use axum::response::Html;
use quizmaster_core::{
  account::User,
  attempt::{ANSWER_FIELD_PREFIX, Attempt},
  catalog::{OptionSlot, Question, Quiz},
};

use super::{Cell, Chrome, Document, Problem, form_close, form_open, input, page, table};
use crate::forms::ProfileForm;

pub(super) fn quiz_date(quiz: &Quiz) -> String {
  quiz.date.map(|d| d.to_string()).unwrap_or_default()
}

pub(super) fn quiz_duration(quiz: &Quiz) -> String {
  quiz.duration.map(|m| format!("{m} min")).unwrap_or_default()
}

/// Attempt history, shared with the admin view of a user.
pub(super) fn attempts_table(doc: &mut Document, attempts: &[Attempt]) {
  let rows = attempts
    .iter()
    .map(|a| {
      vec![
        Cell::text(&a.quiz_title),
        Cell::text(a.score.score),
        Cell::text(a.score.date.format("%Y-%m-%d %H:%M UTC")),
      ]
    })
    .collect();
  table(doc, &["Quiz", "Score", "Taken"], rows, "No quizzes taken yet.");
}

pub fn dashboard(
  chrome: &Chrome,
  user: &User,
  quizzes: &[Quiz],
  attempts: &[Attempt],
) -> Html<String> {
  page(chrome, "Dashboard", |doc| {
    doc.element("p", &[], &format!("Welcome, {}.", user.display_name()));

    doc.element("h2", &[], "Available quizzes");
    let rows = quizzes
      .iter()
      .map(|q| {
        vec![
          Cell::text(&q.title),
          Cell::text(quiz_date(q)),
          Cell::text(quiz_duration(q)),
          Cell::link(format!("/user/quiz/{}/take", q.id), "Take quiz"),
        ]
      })
      .collect();
    table(
      doc,
      &["Quiz", "Date", "Duration", ""],
      rows,
      "There are no quizzes yet.",
    );

    doc.element("h2", &[], "Your attempts");
    attempts_table(doc, attempts);
  })
}

pub fn profile(
  chrome: &Chrome,
  user: &User,
  form: &ProfileForm,
  problem: Option<&Problem>,
) -> Html<String> {
  page(chrome, "Profile", |doc| {
    doc.element("p", &[], &format!("Signed in as {}.", user.username));
    form_open(doc, "/user/profile", problem);
    input(doc, problem, ("full_name", "Full name"), "text", &form.full_name, false);
    input(
      doc,
      problem,
      ("qualification", "Qualification"),
      "text",
      &form.qualification,
      false,
    );
    input(doc, problem, ("dob", "Date of birth"), "date", &form.dob, false);
    form_close(doc, "Save");
  })
}

pub fn take_quiz(
  chrome: &Chrome,
  quiz: &Quiz,
  questions: &[Question],
) -> Html<String> {
  page(chrome, &quiz.title, |doc| {
    if let Some(minutes) = quiz.duration {
      doc.element("p", &[], &format!("Time allowed: {minutes} minutes."));
    }
    if questions.is_empty() {
      doc.element("p", &[], "This quiz has no questions yet.");
    }

    let action = format!("/user/quiz/{}/submit", quiz.id);
    form_open(doc, &action, None);
    for (n, question) in questions.iter().enumerate() {
      let name = format!("{ANSWER_FIELD_PREFIX}{}", question.id);
      doc.open("fieldset", &[]);
      doc.element("legend", &[], &format!("{}. {}", n + 1, question.statement));
      for slot in OptionSlot::ALL {
        let id = format!("{name}_{slot}");
        let value = slot.to_string();
        doc
          .open("label", &[("for", id.as_str())])
          .void("input", &[
            ("type", "radio"),
            ("id", id.as_str()),
            ("name", name.as_str()),
            ("value", value.as_str()),
          ])
          .text(" ")
          .text(question.option(slot))
          .close("label");
      }
      doc.close("fieldset");
    }
    form_close(doc, "Submit answers");
  })
}
