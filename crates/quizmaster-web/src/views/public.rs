//! Pages reachable without signing in.

use axum::response::Html;

use super::{Chrome, Problem, form_close, form_open, input, page};
use crate::forms::{LoginForm, RegisterForm};

pub fn home(chrome: &Chrome) -> Html<String> {
  page(chrome, "Quiz Master", |doc| {
    doc.element(
      "p",
      &[],
      "Practise for your exams one chapter at a time. Every quiz you take is \
       scored and kept on your dashboard.",
    );
    doc
      .open("p", &[])
      .link("/login", "Log in")
      .text(" or ")
      .link("/register", "create an account")
      .text(".")
      .close("p");
  })
}

pub fn register(
  chrome: &Chrome,
  form: &RegisterForm,
  problem: Option<&Problem>,
) -> Html<String> {
  page(chrome, "Register", |doc| {
    form_open(doc, "/register", problem);
    input(doc, problem, ("username", "Email"), "email", &form.username, true);
    input(doc, problem, ("password", "Password"), "password", "", true);
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
    form_close(doc, "Register");
    doc
      .open("p", &[])
      .text("Already registered? ")
      .link("/login", "Log in")
      .close("p");
  })
}

pub fn login(
  chrome: &Chrome,
  form: &LoginForm,
  problem: Option<&Problem>,
) -> Html<String> {
  page(chrome, "Login", |doc| {
    form_open(doc, "/login", problem);
    input(doc, problem, ("username", "Email"), "email", &form.username, true);
    input(doc, problem, ("password", "Password"), "password", "", true);
    form_close(doc, "Log in");
    doc
      .open("p", &[])
      .text("No account yet? ")
      .link("/register", "Register")
      .close("p");
  })
}
