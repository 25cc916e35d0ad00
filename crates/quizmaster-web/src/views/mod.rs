//! Server-rendered HTML.
//!
//! Pages are generated with `quick-xml`'s writer, which escapes every text
//! node and attribute value. [`Document`] wraps the writer with the handful
//! of operations the pages need; [`page`] adds the shared chrome (navigation
//! and flash messages) around a body.

pub mod admin;
pub mod catalog;
pub mod member;
pub mod public;

use axum::{http::StatusCode, response::Html};
use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};
use quizmaster_core::account::Role;

use crate::{
  error::Error,
  session::{Flash, Identity, Session},
};

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:0 auto;padding:1rem}\
nav a{margin-right:1rem}table{border-collapse:collapse;width:100%}\
td,th{border:1px solid #ccc;padding:.3rem .5rem;text-align:left}\
.flash{padding:.5rem;margin:.5rem 0;border-radius:4px}\
.flash.success{background:#e3f6e3}.flash.error{background:#fbe3e3}\
form.inline{display:inline}label{display:block;margin-top:.5rem}\
[aria-invalid=true]{border-color:#c00}";

// ─── Document builder ────────────────────────────────────────────────────────

/// An HTML document under construction.
pub struct Document {
  writer: Writer<Vec<u8>>,
}

impl Document {
  pub fn new() -> Self {
    let mut doc = Document { writer: Writer::new(Vec::new()) };
    doc.emit(Event::DocType(BytesText::from_escaped("html")));
    doc
  }

  fn emit(&mut self, event: Event<'_>) {
    // Writing into a Vec<u8> cannot fail.
    let written = self.writer.write_event(event);
    debug_assert!(written.is_ok(), "html write failed: {written:?}");
  }

  pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
    let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
    self.emit(Event::Start(start));
    self
  }

  pub fn close(&mut self, tag: &str) -> &mut Self {
    self.emit(Event::End(BytesEnd::new(tag)));
    self
  }

  /// An element without content, such as `<input>`.
  pub fn void(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
    let start = BytesStart::new(tag).with_attributes(attrs.iter().copied());
    self.emit(Event::Empty(start));
    self
  }

  pub fn text(&mut self, text: &str) -> &mut Self {
    self.emit(Event::Text(BytesText::new(text)));
    self
  }

  /// `<tag attrs>text</tag>`
  pub fn element(
    &mut self,
    tag: &str,
    attrs: &[(&str, &str)],
    text: &str,
  ) -> &mut Self {
    self.open(tag, attrs).text(text).close(tag)
  }

  pub fn link(&mut self, href: &str, text: &str) -> &mut Self {
    self.element("a", &[("href", href)], text)
  }

  pub fn finish(self) -> String {
    String::from_utf8_lossy(&self.writer.into_inner()).into_owned()
  }
}

impl Default for Document {
  fn default() -> Self { Self::new() }
}

// ─── Page chrome ─────────────────────────────────────────────────────────────

/// Per-request context every page shows: who is signed in and the flash
/// messages waiting for them.
pub struct Chrome {
  pub identity: Option<Identity>,
  pub flashes:  Vec<Flash>,
}

impl Chrome {
  /// Consumes the session's pending flash messages.
  pub fn from_session(session: &Session) -> Self {
    Chrome {
      identity: session.identity(),
      flashes:  session.take_flashes(),
    }
  }

  pub fn anonymous() -> Self { Chrome { identity: None, flashes: Vec::new() } }
}

fn navigation(doc: &mut Document, identity: Option<Identity>) {
  doc.open("nav", &[]);
  match identity.map(|i| i.role) {
    None => {
      doc
        .link("/", "Home")
        .link("/login", "Login")
        .link("/register", "Register");
    }
    Some(Role::User) => {
      doc
        .link("/user/dashboard", "Dashboard")
        .link("/user/profile", "Profile")
        .link("/logout", "Logout");
    }
    Some(Role::Admin) => {
      doc
        .link("/admin_dashboard", "Dashboard")
        .link("/admin/subjects", "Subjects")
        .link("/admin/chapters", "Chapters")
        .link("/admin/quizzes", "Quizzes")
        .link("/admin/questions", "Questions")
        .link("/admin/users", "Users")
        .link("/logout", "Logout");
    }
  }
  doc.close("nav");
}

/// Render a full page around `body`.
pub fn page(
  chrome: &Chrome,
  title: &str,
  body: impl FnOnce(&mut Document),
) -> Html<String> {
  let mut doc = Document::new();
  doc.open("html", &[("lang", "en")]);

  doc.open("head", &[]);
  doc.void("meta", &[("charset", "utf-8")]);
  doc.element("title", &[], &format!("{title} · Quiz Master"));
  doc.element("style", &[], STYLE);
  doc.close("head");

  doc.open("body", &[]);
  navigation(&mut doc, chrome.identity);
  for flash in &chrome.flashes {
    let class = format!("flash {}", flash.level.as_str());
    doc.element("div", &[("class", class.as_str()), ("role", "status")], &flash.message);
  }
  doc.element("h1", &[], title);
  body(&mut doc);
  doc.close("body");

  doc.close("html");
  Html(doc.finish())
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
  let title = status.canonical_reason().unwrap_or("Error");
  page(&Chrome::anonymous(), title, |doc| {
    doc.element("p", &[], message);
    doc.open("p", &[]).link("/", "Back to the start page").close("p");
  })
}

// ─── Tables ──────────────────────────────────────────────────────────────────

pub enum Cell {
  Text(String),
  Link { href: String, text: String },
  /// A button posting to `action`.
  Delete { action: String },
}

impl Cell {
  pub fn text(text: impl ToString) -> Self { Cell::Text(text.to_string()) }

  pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
    Cell::Link { href: href.into(), text: text.into() }
  }

  pub fn delete(action: impl Into<String>) -> Self {
    Cell::Delete { action: action.into() }
  }
}

/// A table, or `empty` as a paragraph when there are no rows.
pub fn table(
  doc: &mut Document,
  headers: &[&str],
  rows: Vec<Vec<Cell>>,
  empty: &str,
) {
  if rows.is_empty() {
    doc.element("p", &[], empty);
    return;
  }
  doc.open("table", &[]).open("thead", &[]).open("tr", &[]);
  for header in headers {
    doc.element("th", &[], header);
  }
  doc.close("tr").close("thead").open("tbody", &[]);
  for row in rows {
    doc.open("tr", &[]);
    for cell in row {
      doc.open("td", &[]);
      match cell {
        Cell::Text(text) => {
          doc.text(&text);
        }
        Cell::Link { href, text } => {
          doc.link(&href, &text);
        }
        Cell::Delete { action } => {
          doc
            .open("form", &[
              ("class", "inline"),
              ("method", "post"),
              ("action", action.as_str()),
            ])
            .element("button", &[("type", "submit")], "Delete")
            .close("form");
        }
      }
      doc.close("td");
    }
    doc.close("tr");
  }
  doc.close("tbody").close("table");
}

// ─── Forms ───────────────────────────────────────────────────────────────────

/// What went wrong with a submitted form.
pub struct Problem {
  pub field:   Option<&'static str>,
  pub message: String,
}

impl Problem {
  /// A problem with the form as a whole.
  pub fn general(message: impl Into<String>) -> Self {
    Problem { field: None, message: message.into() }
  }

  fn marks(&self, field: &str) -> bool { self.field == Some(field) }
}

impl From<&Error> for Problem {
  fn from(e: &Error) -> Self {
    Problem { field: e.field(), message: e.to_string() }
  }
}

/// Opens a `<form>` and shows `problem`, if any, above it.
pub fn form_open(doc: &mut Document, action: &str, problem: Option<&Problem>) {
  if let Some(problem) = problem {
    doc.element("div", &[("class", "flash error"), ("role", "alert")], &problem.message);
  }
  doc.open("form", &[("method", "post"), ("action", action)]);
}

pub fn form_close(doc: &mut Document, submit: &str) {
  doc
    .element("button", &[("type", "submit")], submit)
    .close("form");
}

fn field_attrs<'a>(
  name: &'a str,
  problem: Option<&Problem>,
  required: bool,
) -> Vec<(&'a str, &'a str)> {
  let mut attrs = vec![("id", name), ("name", name)];
  if required {
    attrs.push(("required", "required"));
  }
  if problem.is_some_and(|p| p.marks(name)) {
    attrs.push(("aria-invalid", "true"));
  }
  attrs
}

/// `kind` is the `<input type>`: text, password, date, number, email.
pub fn input(
  doc: &mut Document,
  problem: Option<&Problem>,
  (name, label): (&str, &str),
  kind: &str,
  value: &str,
  required: bool,
) {
  doc.element("label", &[("for", name)], label);
  let mut attrs = field_attrs(name, problem, required);
  attrs.push(("type", kind));
  if kind != "password" {
    attrs.push(("value", value));
  }
  doc.void("input", &attrs);
}

pub fn textarea(
  doc: &mut Document,
  problem: Option<&Problem>,
  (name, label): (&str, &str),
  value: &str,
) {
  doc.element("label", &[("for", name)], label);
  doc.element("textarea", &field_attrs(name, problem, false), value);
}

/// A drop-down of `(value, label)` pairs with `selected` preselected.
pub fn select(
  doc: &mut Document,
  problem: Option<&Problem>,
  (name, label): (&str, &str),
  choices: &[(String, String)],
  selected: &str,
) {
  doc.element("label", &[("for", name)], label);
  doc.open("select", &field_attrs(name, problem, true));
  doc.element("option", &[("value", "")], "Choose…");
  for (value, text) in choices {
    let mut attrs = vec![("value", value.as_str())];
    if value == selected {
      attrs.push(("selected", "selected"));
    }
    doc.element("option", &attrs, text);
  }
  doc.close("select");
}
