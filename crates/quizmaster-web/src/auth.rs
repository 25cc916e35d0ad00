//! Password hashing and the role gate extractors.
//!
//! Handlers state who may call them by taking [`Visitor`], [`CurrentUser`] or
//! [`CurrentAdmin`]. Extractors run before the handler body, so a refused
//! request never reaches the store.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use quizmaster_core::account::Role;
use rand_core::OsRng;

use crate::{
  error::Error,
  session::{FlashLevel, Identity, Session},
};

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Any request. Carries the identity if someone is signed in.
pub struct Visitor {
  pub session:  Session,
  pub identity: Option<Identity>,
}

/// A signed-in account of either role.
pub struct CurrentUser {
  pub session: Session,
  pub user_id: i64,
  pub role:    Role,
}

/// A signed-in administrator.
pub struct CurrentAdmin {
  pub session: Session,
  pub user_id: i64,
}

impl<S> FromRequestParts<S> for Visitor
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let session = Session::from_request_parts(parts, state).await?;
    let identity = session.identity();
    Ok(Visitor { session, identity })
  }
}

impl<S> FromRequestParts<S> for CurrentUser
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Visitor { session, identity } =
      Visitor::from_request_parts(parts, state).await?;
    match identity {
      Some(Identity { user_id, role }) => {
        Ok(CurrentUser { session, user_id, role })
      }
      None => {
        session.flash(FlashLevel::Error, "Please log in to continue.");
        Err(Error::Unauthorized)
      }
    }
  }
}

impl<S> FromRequestParts<S> for CurrentAdmin
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Visitor { session, identity } =
      Visitor::from_request_parts(parts, state).await?;
    match identity {
      Some(Identity { user_id, role: Role::Admin }) => {
        Ok(CurrentAdmin { session, user_id })
      }
      _ => {
        tracing::warn!(path = %parts.uri.path(), "admin route refused");
        session.flash(FlashLevel::Error, "Admin access required.");
        Err(Error::Unauthorized)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::Request;

  use super::*;
  use crate::session::SessionStore;

  #[test]
  fn hashes_verify_only_their_password() {
    let hash = hash_password("hunter2").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("hunter2", &hash));
    assert!(!verify_password("hunter3", &hash));
    assert!(!verify_password("hunter2", "not a phc string"));
  }

  fn parts_with(session: &Session) -> Parts {
    let (mut parts, ()) = Request::builder()
      .uri("/admin/subjects")
      .body(())
      .unwrap()
      .into_parts();
    parts.extensions.insert(session.clone());
    parts
  }

  #[tokio::test]
  async fn admin_gate_refuses_plain_users_with_a_flash() {
    let session = Session::new(Arc::new(SessionStore::new("s").unwrap()), None);
    session.sign_in(Identity { user_id: 2, role: Role::User });
    let mut parts = parts_with(&session);

    let user = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(user.user_id, 2);

    let refused = CurrentAdmin::from_request_parts(&mut parts, &()).await;
    assert!(matches!(refused, Err(Error::Unauthorized)));
    let flashes = session.take_flashes();
    assert_eq!(flashes[0].message, "Admin access required.");
  }

  #[tokio::test]
  async fn anonymous_requests_are_visitors_only() {
    let session = Session::new(Arc::new(SessionStore::new("s").unwrap()), None);
    let mut parts = parts_with(&session);

    let visitor = Visitor::from_request_parts(&mut parts, &()).await.unwrap();
    assert!(visitor.identity.is_none());

    let refused = CurrentUser::from_request_parts(&mut parts, &()).await;
    assert!(matches!(refused, Err(Error::Unauthorized)));
    assert_eq!(session.take_flashes()[0].message, "Please log in to continue.");
  }

  #[tokio::test]
  async fn missing_session_layer_is_an_internal_error() {
    let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();
    let res = Visitor::from_request_parts(&mut parts, &()).await;
    assert!(matches!(res, Err(Error::Internal(_))));
  }
}
