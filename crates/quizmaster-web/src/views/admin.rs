//! Administrator landing page and account management.

use axum::response::Html;
use quizmaster_core::{
  account::User,
  attempt::{Attempt, SubjectStats},
};

use super::{Cell, Chrome, member::attempts_table, page, table};

pub fn dashboard(chrome: &Chrome, stats: &[SubjectStats]) -> Html<String> {
  page(chrome, "Admin dashboard", |doc| {
    doc.open("ul", &[]);
    for (href, text) in [
      ("/admin/subjects", "Subjects"),
      ("/admin/chapters", "Chapters"),
      ("/admin/quizzes", "Quizzes"),
      ("/admin/questions", "Questions"),
      ("/admin/users", "Users"),
    ] {
      doc.open("li", &[]).link(href, text).close("li");
    }
    doc.close("ul");

    doc.element("h2", &[], "Attempts per subject");
    let rows = stats
      .iter()
      .map(|s| {
        vec![
          Cell::text(&s.subject),
          Cell::text(s.attempts),
          Cell::text(format!("{:.2}", s.average_score)),
        ]
      })
      .collect();
    table(
      doc,
      &["Subject", "Attempts", "Average score"],
      rows,
      "No quizzes have been taken yet.",
    );
    doc.open("p", &[]).link("/quiz-data", "Raw data (JSON)").close("p");
  })
}

pub fn users(chrome: &Chrome, users: &[User]) -> Html<String> {
  page(chrome, "Users", |doc| {
    let rows = users
      .iter()
      .map(|u| {
        vec![
          Cell::text(&u.username),
          Cell::text(u.full_name.as_deref().unwrap_or("")),
          Cell::text(u.qualification.as_deref().unwrap_or("")),
          Cell::text(u.role.as_str()),
          Cell::link(format!("/admin/users/{}/quizzes", u.id), "Attempts"),
          Cell::delete(format!("/admin/users/{}/delete", u.id)),
        ]
      })
      .collect();
    table(
      doc,
      &["Username", "Full name", "Qualification", "Role", "", ""],
      rows,
      "No accounts.",
    );
  })
}

pub fn user_attempts(
  chrome: &Chrome,
  user: &User,
  attempts: &[Attempt],
) -> Html<String> {
  page(chrome, &format!("Attempts by {}", user.username), |doc| {
    attempts_table(doc, attempts);
    doc.open("p", &[]).link("/admin/users", "All users").close("p");
  })
}
