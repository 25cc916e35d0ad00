//! User accounts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The single authorization flag carried by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  #[default]
  User,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::User => "user",
    }
  }

  pub fn is_admin(self) -> bool { matches!(self, Role::Admin) }
}

/// A registered account. The password hash never leaves the store except
/// through [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:            i64,
  /// Login name; in practice an email address.
  pub username:      String,
  pub full_name:     Option<String>,
  pub qualification: Option<String>,
  pub dob:           Option<NaiveDate>,
  pub role:          Role,
}

impl User {
  /// Name to greet the user with.
  pub fn display_name(&self) -> &str {
    self
      .full_name
      .as_deref()
      .filter(|n| !n.is_empty())
      .unwrap_or(&self.username)
  }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  /// Argon2 PHC string; hashing is the caller's job.
  pub password_hash: String,
  pub full_name:     Option<String>,
  pub qualification: Option<String>,
  pub dob:           Option<NaiveDate>,
  pub role:          Role,
}

/// The editable part of an account. Updates replace all three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
  pub full_name:     Option<String>,
  pub qualification: Option<String>,
  pub dob:           Option<NaiveDate>,
}

/// An account together with its stored password hash, for login.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}
