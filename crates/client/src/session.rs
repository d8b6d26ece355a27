//! Session state: bearer token and current user.
//!
//! A session is created on successful login or registration, destroyed on
//! logout, and persisted across process restarts through [`SessionStore`]
//! (the durable-storage analog of a browser's local storage). All
//! authenticated API calls borrow the token from here; without one they are
//! short-circuited before any network traffic.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::UserProfile;

/// Errors from session handling and persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An operation that requires authentication was attempted anonymously.
    #[error("not signed in")]
    NotAuthenticated,
    /// Reading or writing the session file failed.
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
    /// The session file contents are not valid.
    #[error("corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// An opaque bearer credential for the Tienda API.
///
/// Wraps [`SecretString`] so the token never appears in `Debug` output or
/// logs; it is exposed only at the two boundaries that need the raw value
/// (the `Authorization` header and the session file).
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(raw: String) -> Self {
        Self(SecretString::from(raw))
    }

    /// Expose the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// The current session: token and profile, or neither.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<AuthToken>,
    user: Option<UserProfile>,
}

impl Session {
    /// An anonymous session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session established from a login/registration response.
    #[must_use]
    pub fn authenticated(token: AuthToken, user: UserProfile) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// The bearer token, or [`SessionError::NotAuthenticated`].
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when the session is anonymous.
    pub fn require_token(&self) -> Result<&AuthToken, SessionError> {
        match self.token.as_ref() {
            Some(token) => Ok(token),
            None => Err(SessionError::NotAuthenticated),
        }
    }

    /// The current user's profile, if loaded.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// The saved shipping address from the profile, if any.
    #[must_use]
    pub fn profile_address(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.address.as_deref())
            .filter(|a| !a.is_empty())
    }

    /// Replace the cached profile (e.g., after `/auth/profile`).
    pub fn set_user(&mut self, user: UserProfile) {
        self.user = Some(user);
    }

    /// Drop token and profile, returning to anonymous.
    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

/// On-disk serialized form of a session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: Option<UserProfile>,
}

/// Persists the session to a file across process restarts.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store over the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted session, or an anonymous one if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Session, SessionError> {
        if !self.path.exists() {
            return Ok(Session::anonymous());
        }

        let raw = fs::read_to_string(&self.path)?;
        let stored: StoredSession = serde_json::from_str(&raw)?;

        Ok(Session {
            token: Some(AuthToken::new(stored.token)),
            user: stored.user,
        })
    }

    /// Persist the session. An anonymous session deletes the file instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be
    /// written.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let Some(token) = session.token() else {
            return self.clear();
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredSession {
            token: token.expose().to_owned(),
            user: session.user().cloned(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        Ok(())
    }

    /// Delete the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir()
            .join(format!("tienda-session-test-{name}-{}", std::process::id()))
            .join("session.json");
        let store = SessionStore::new(path);
        store.clear().unwrap();
        store
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: None,
            name: "Ana".to_owned(),
            email: Some("ana@example.com".to_owned()),
            address: Some("Main 123".to_owned()),
        }
    }

    #[test]
    fn missing_file_loads_anonymous() {
        let store = temp_store("missing");
        let session = store.load().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.require_token().is_err());
    }

    #[test]
    fn session_round_trips_through_disk() {
        let store = temp_store("roundtrip");
        let session = Session::authenticated(AuthToken::new("tok-123".to_owned()), profile());
        store.save(&session).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.require_token().unwrap().expose(), "tok-123");
        assert_eq!(loaded.profile_address(), Some("Main 123"));

        store.clear().unwrap();
        assert!(!store.load().unwrap().is_authenticated());
    }

    #[test]
    fn saving_anonymous_session_deletes_the_file() {
        let store = temp_store("logout");
        let session = Session::authenticated(AuthToken::new("tok".to_owned()), profile());
        store.save(&session).unwrap();

        store.save(&Session::anonymous()).unwrap();
        assert!(!store.load().unwrap().is_authenticated());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthToken::new("super-secret".to_owned());
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn empty_profile_address_is_treated_as_absent() {
        let mut user = profile();
        user.address = Some(String::new());
        let session = Session::authenticated(AuthToken::new("tok".to_owned()), user);
        assert_eq!(session.profile_address(), None);
    }
}
