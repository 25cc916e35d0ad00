//! Server-side sessions keyed by a signed cookie.
//!
//! Session data (who is signed in, pending flash messages) never leaves the
//! process. The browser only holds `<uuid>.<signature>`, where the signature
//! is the hex HMAC-SHA256 of the uuid under the configured secret. A cookie
//! that fails verification, or that names a session this process does not
//! know, is treated as absent.
//!
//! Anonymous sessions exist only to carry flash messages. They are dropped as
//! soon as their messages are shown, and at most [`MAX_ANONYMOUS_SESSIONS`]
//! are kept; past that the oldest is evicted.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
  },
};

use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, HeaderValue, header, request::Parts},
  middleware::Next,
  response::Response,
};
use hmac::{Hmac, Mac};
use quizmaster_core::account::Role;
use sha2::Sha256;
use uuid::Uuid;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "quizmaster_session";

/// Upper bound on sessions that hold only flash messages.
pub const MAX_ANONYMOUS_SESSIONS: usize = 256;

// ─── Session data ─────────────────────────────────────────────────────────────

/// Who a signed-in session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
  pub user_id: i64,
  pub role:    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
  Success,
  Error,
}

impl FlashLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      FlashLevel::Success => "success",
      FlashLevel::Error => "error",
    }
  }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
  pub level:   FlashLevel,
  pub message: String,
}

#[derive(Debug)]
struct SessionData {
  identity: Option<Identity>,
  flashes:  Vec<Flash>,
  /// Issue order, for eviction.
  serial:   u64,
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// All live sessions of this process.
pub struct SessionStore {
  key:      HmacSha256,
  sessions: Mutex<HashMap<Uuid, SessionData>>,
  issued:   AtomicU64,
}

impl SessionStore {
  pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, Error> {
    let key = HmacSha256::new_from_slice(secret.as_ref())
      .map_err(|e| Error::Internal(format!("session secret rejected: {e}")))?;
    Ok(Self {
      key,
      sessions: Mutex::new(HashMap::new()),
      issued: AtomicU64::new(0),
    })
  }

  fn data(&self, identity: Option<Identity>, flashes: Vec<Flash>) -> SessionData {
    let serial = self.issued.fetch_add(1, Ordering::Relaxed);
    SessionData { identity, flashes, serial }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionData>> {
    // The map is left consistent by every critical section, so a panic
    // elsewhere does not poison it in any meaningful way.
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn mac(&self, id: Uuid) -> HmacSha256 {
    let mut mac = self.key.clone();
    mac.update(id.as_bytes());
    mac
  }

  fn signature(&self, id: Uuid) -> String {
    hex::encode(self.mac(id).finalize().into_bytes())
  }

  /// The cookie value for session `id`.
  pub fn cookie_value(&self, id: Uuid) -> String {
    format!("{id}.{}", self.signature(id))
  }

  /// Resolve a cookie value to a live session id.
  pub fn resolve(&self, value: &str) -> Option<Uuid> {
    let (id, signature) = value.split_once('.')?;
    let id = Uuid::parse_str(id).ok()?;
    let signature = hex::decode(signature).ok()?;
    self.mac(id).verify_slice(&signature).ok()?;
    self.lock().contains_key(&id).then_some(id)
  }

  /// End every session signed in as `user_id`. Returns how many were ended.
  pub fn sign_out_user(&self, user_id: i64) -> usize {
    let mut sessions = self.lock();
    let before = sessions.len();
    sessions.retain(|_, data| data.identity.is_none_or(|i| i.user_id != user_id));
    before - sessions.len()
  }

  /// Number of live sessions.
  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Make room for one more anonymous session.
fn evict_anonymous(sessions: &mut HashMap<Uuid, SessionData>) {
  let anonymous = sessions.values().filter(|d| d.identity.is_none()).count();
  if anonymous < MAX_ANONYMOUS_SESSIONS {
    return;
  }
  let oldest = sessions
    .iter()
    .filter(|(_, d)| d.identity.is_none())
    .min_by_key(|(_, d)| d.serial)
    .map(|(id, _)| *id);
  if let Some(id) = oldest {
    sessions.remove(&id);
  }
}

// ─── Request-scoped handle ───────────────────────────────────────────────────

/// The session of the request being handled.
///
/// Inserted into the request extensions by [`layer`]. A session is only
/// created in the store once something is written to it.
#[derive(Clone)]
pub struct Session {
  store: Arc<SessionStore>,
  id:    Arc<Mutex<Option<Uuid>>>,
}

impl Session {
  pub fn new(store: Arc<SessionStore>, id: Option<Uuid>) -> Self {
    Self { store, id: Arc::new(Mutex::new(id)) }
  }

  fn id_slot(&self) -> MutexGuard<'_, Option<Uuid>> {
    self.id.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn id(&self) -> Option<Uuid> { *self.id_slot() }

  pub fn identity(&self) -> Option<Identity> {
    let id = self.id()?;
    self.store.lock().get(&id).and_then(|data| data.identity)
  }

  /// Queue a message for the next rendered page.
  pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
    let mut slot = self.id_slot();
    let mut sessions = self.store.lock();
    let flash = Flash { level, message: message.into() };
    if let Some(data) = slot.and_then(|id| sessions.get_mut(&id)) {
      data.flashes.push(flash);
      return;
    }
    evict_anonymous(&mut sessions);
    let id = Uuid::new_v4();
    sessions.insert(id, self.store.data(None, vec![flash]));
    *slot = Some(id);
  }

  /// Drain the queued messages. An anonymous session has nothing left after
  /// this and is dropped.
  pub fn take_flashes(&self) -> Vec<Flash> {
    let mut slot = self.id_slot();
    let Some(id) = *slot else { return Vec::new() };
    let mut sessions = self.store.lock();
    let Some(data) = sessions.get_mut(&id) else { return Vec::new() };
    let flashes = std::mem::take(&mut data.flashes);
    if data.identity.is_none() {
      sessions.remove(&id);
      *slot = None;
    }
    flashes
  }

  /// Bind `identity` to a fresh session id. Pending flashes carry over; the
  /// old id stops resolving.
  pub fn sign_in(&self, identity: Identity) {
    let mut slot = self.id_slot();
    let mut sessions = self.store.lock();
    let flashes = slot
      .and_then(|old| sessions.remove(&old))
      .map(|data| data.flashes)
      .unwrap_or_default();
    let id = Uuid::new_v4();
    sessions.insert(id, self.store.data(Some(identity), flashes));
    *slot = Some(id);
  }

  /// Forget the session entirely.
  pub fn sign_out(&self) {
    let mut slot = self.id_slot();
    if let Some(old) = slot.take() {
      self.store.lock().remove(&old);
    }
  }
}

impl<S> FromRequestParts<S> for Session
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Session>()
      .cloned()
      .ok_or_else(|| Error::Internal("session layer is not installed".into()))
  }
}

// ─── Middleware ──────────────────────────────────────────────────────────────

fn cookie_from_headers(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == COOKIE_NAME)
    .map(|(_, value)| value.to_owned())
}

/// Attach a [`Session`] to every request and write the cookie back when the
/// handler created, rotated or dropped the session.
pub async fn layer(
  State(store): State<Arc<SessionStore>>,
  mut req: Request,
  next: Next,
) -> Response {
  let initial = cookie_from_headers(req.headers()).and_then(|v| store.resolve(&v));
  let session = Session::new(store.clone(), initial);
  req.extensions_mut().insert(session.clone());

  let mut res = next.run(req).await;

  let current = session.id();
  if current != initial {
    let cookie = match current {
      Some(id) => format!(
        "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
        store.cookie_value(id)
      ),
      None => format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    };
    match HeaderValue::from_str(&cookie) {
      Ok(value) => {
        res.headers_mut().append(header::SET_COOKIE, value);
      }
      Err(e) => tracing::error!(error = %e, "unencodable session cookie"),
    }
  }

  res
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> Arc<SessionStore> { Arc::new(SessionStore::new("test-secret").unwrap()) }

  const ADMIN: Identity = Identity { user_id: 1, role: Role::Admin };

  #[test]
  fn cookie_round_trips_for_live_sessions() {
    let store = store();
    let session = Session::new(store.clone(), None);
    session.sign_in(ADMIN);
    let id = session.id().unwrap();

    assert_eq!(store.resolve(&store.cookie_value(id)), Some(id));
  }

  #[test]
  fn tampered_or_foreign_cookies_are_ignored() {
    let store = store();
    let session = Session::new(store.clone(), None);
    session.sign_in(ADMIN);
    let id = session.id().unwrap();

    let forged = format!("{id}.{}", "0".repeat(64));
    assert_eq!(store.resolve(&forged), None);
    assert_eq!(store.resolve(&format!("{id}.not-hex")), None);
    assert_eq!(store.resolve("not-a-cookie"), None);

    let other = SessionStore::new("other-secret").unwrap();
    assert_eq!(store.resolve(&other.cookie_value(id)), None);

    // Correctly signed, but never issued.
    assert_eq!(store.resolve(&store.cookie_value(Uuid::new_v4())), None);
  }

  #[test]
  fn flashes_are_delivered_once() {
    let store = store();
    let session = Session::new(store.clone(), None);
    assert!(session.take_flashes().is_empty());
    assert!(store.is_empty());

    session.flash(FlashLevel::Success, "saved");
    session.flash(FlashLevel::Error, "but also");
    assert!(session.id().is_some());
    assert_eq!(session.identity(), None);

    let flashes = session.take_flashes();
    assert_eq!(flashes.len(), 2);
    assert_eq!(flashes[0].message, "saved");
    assert_eq!(flashes[1].level, FlashLevel::Error);
    assert!(session.take_flashes().is_empty());

    // Nothing left to carry.
    assert_eq!(session.id(), None);
    assert!(store.is_empty());
  }

  #[test]
  fn anonymous_sessions_are_capped_and_signed_in_ones_kept() {
    let store = store();
    let member = Session::new(store.clone(), None);
    member.sign_in(Identity { user_id: 3, role: Role::User });

    let first = Session::new(store.clone(), None);
    first.flash(FlashLevel::Error, "first");
    for _ in 0..MAX_ANONYMOUS_SESSIONS {
      Session::new(store.clone(), None).flash(FlashLevel::Error, "refused");
    }

    assert_eq!(store.len(), MAX_ANONYMOUS_SESSIONS + 1);
    assert!(member.identity().is_some());
    assert!(first.take_flashes().is_empty(), "oldest is evicted");
  }

  #[test]
  fn signing_out_a_user_ends_all_their_sessions() {
    let store = store();
    let laptop = Session::new(store.clone(), None);
    let phone = Session::new(store.clone(), None);
    let other = Session::new(store.clone(), None);
    laptop.sign_in(Identity { user_id: 5, role: Role::User });
    phone.sign_in(Identity { user_id: 5, role: Role::User });
    other.sign_in(Identity { user_id: 6, role: Role::User });

    assert_eq!(store.sign_out_user(5), 2);
    assert_eq!(laptop.identity(), None);
    assert_eq!(phone.identity(), None);
    assert_eq!(other.identity().map(|i| i.user_id), Some(6));
    assert_eq!(store.sign_out_user(5), 0);
  }

  #[test]
  fn sign_in_rotates_id_and_keeps_flashes() {
    let store = store();
    let session = Session::new(store.clone(), None);
    session.flash(FlashLevel::Error, "please log in");
    let anonymous = session.id().unwrap();

    session.sign_in(Identity { user_id: 7, role: Role::User });
    let signed_in = session.id().unwrap();

    assert_ne!(anonymous, signed_in);
    assert_eq!(store.resolve(&store.cookie_value(anonymous)), None);
    assert_eq!(session.identity().unwrap().user_id, 7);
    assert_eq!(session.take_flashes().len(), 1);
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn sign_out_forgets_the_session() {
    let store = store();
    let session = Session::new(store.clone(), None);
    session.sign_in(ADMIN);
    session.sign_out();

    assert_eq!(session.id(), None);
    assert_eq!(session.identity(), None);
    assert!(store.is_empty());
  }

  #[test]
  fn cookie_header_parsing_finds_our_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::COOKIE,
      HeaderValue::from_static("theme=dark; quizmaster_session=abc.def; x=y"),
    );
    assert_eq!(cookie_from_headers(&headers).as_deref(), Some("abc.def"));
    assert_eq!(cookie_from_headers(&HeaderMap::new()), None);
  }
}
