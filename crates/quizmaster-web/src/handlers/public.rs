//! Landing page, registration, login and logout.

use axum::{
  Form,
  extract::State,
  http::StatusCode,
  response::{Html, IntoResponse, Redirect, Response},
};
use quizmaster_core::{
  account::{NewUser, Role},
  store::QuizStore,
};

use super::{done, rerender};
use crate::{
  AppState,
  auth::{Visitor, hash_password, verify_password},
  error::Error,
  forms::{LoginForm, RegisterForm},
  session::Identity,
  views::{self, Chrome, Problem},
};

/// Where an account lands after signing in.
pub(crate) fn home_for(role: Role) -> &'static str {
  match role {
    Role::Admin => "/admin_dashboard",
    Role::User => "/user/dashboard",
  }
}

pub async fn home(visitor: Visitor) -> Html<String> {
  views::public::home(&Chrome::from_session(&visitor.session))
}

pub async fn register_form(visitor: Visitor) -> Html<String> {
  let chrome = Chrome::from_session(&visitor.session);
  views::public::register(&chrome, &RegisterForm::default(), None)
}

pub async fn register<S: QuizStore>(
  State(state): State<AppState<S>>,
  visitor: Visitor,
  Form(form): Form<RegisterForm>,
) -> Result<Response, Error> {
  let outcome = async {
    let registration = form.validate()?;
    let input = NewUser {
      username:      registration.username,
      password_hash: hash_password(&registration.password)?,
      full_name:     registration.profile.full_name,
      qualification: registration.profile.qualification,
      dob:           registration.profile.dob,
      role:          Role::User,
    };
    state.store.create_user(input).await.map_err(Error::store)
  }
  .await;

  match outcome {
    Ok(user) => {
      tracing::info!(user_id = user.id, username = %user.username, "account registered");
      Ok(done(
        &visitor.session,
        "Registration successful. Please log in.",
        "/login",
      ))
    }
    Err(problem) if problem.is_form_problem() => {
      let chrome = Chrome::from_session(&visitor.session);
      let page =
        views::public::register(&chrome, &form, Some(&Problem::from(&problem)));
      Ok(rerender(&problem, page))
    }
    Err(e) => Err(e),
  }
}

pub async fn login_form(visitor: Visitor) -> Html<String> {
  let chrome = Chrome::from_session(&visitor.session);
  views::public::login(&chrome, &LoginForm::default(), None)
}

pub async fn login<S: QuizStore>(
  State(state): State<AppState<S>>,
  visitor: Visitor,
  Form(form): Form<LoginForm>,
) -> Result<Response, Error> {
  let (username, password) = match form.validate() {
    Ok(pair) => pair,
    Err(problem) => {
      let chrome = Chrome::from_session(&visitor.session);
      let page = views::public::login(&chrome, &form, Some(&Problem::from(&problem)));
      return Ok(rerender(&problem, page));
    }
  };

  let credentials = state
    .store
    .find_credentials(username.clone())
    .await
    .map_err(Error::store)?
    .filter(|c| verify_password(&password, &c.password_hash));

  let Some(credentials) = credentials else {
    tracing::warn!(%username, "failed login");
    let chrome = Chrome::from_session(&visitor.session);
    let page = views::public::login(
      &chrome,
      &form,
      Some(&Problem::general("Invalid credentials")),
    );
    return Ok((StatusCode::UNAUTHORIZED, page).into_response());
  };

  let user = credentials.user;
  visitor.session.sign_in(Identity { user_id: user.id, role: user.role });
  tracing::info!(user_id = user.id, role = user.role.as_str(), "signed in");
  Ok(Redirect::to(home_for(user.role)).into_response())
}

pub async fn logout(visitor: Visitor) -> Redirect {
  if let Some(identity) = visitor.identity {
    tracing::info!(user_id = identity.user_id, "signed out");
  }
  visitor.session.sign_out();
  Redirect::to("/")
}
