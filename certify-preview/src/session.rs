//! Session credentials
//!
//! Fetchers and clients never look up a token themselves; they are handed a
//! [`CredentialProvider`] and ask it for a bearer token on every request. The
//! [`SessionStore`] gives that provider an explicit lifecycle: a token exists
//! between `sign_in` and `sign_out` and stops being handed out once expired.

use crate::error::FetchError;
use crate::models::Role;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Source of the bearer token attached to every request
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `FetchError::Unauthenticated` when none is usable
    fn bearer_token(&self) -> Result<SecretString, FetchError>;
}

struct Session {
    token: SecretString,
    role: Role,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

/// In-process session holder
#[derive(Default)]
pub struct SessionStore {
    session: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing session
    pub fn sign_in(&self, token: impl Into<String>, role: Role, expires_at: Option<DateTime<Utc>>) {
        let session = Session {
            token: SecretString::new(token.into()),
            role,
            expires_at,
        };
        *self.session.write() = Some(session);
        tracing::debug!(role = %role, "Session established");
    }

    pub fn sign_out(&self) {
        if self.session.write().take().is_some() {
            tracing::debug!("Session cleared");
        }
    }

    pub fn is_active(&self) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(|session| !session.is_expired(Utc::now()))
    }

    pub fn role(&self) -> Option<Role> {
        self.session.read().as_ref().map(|session| session.role)
    }
}

impl CredentialProvider for SessionStore {
    fn bearer_token(&self) -> Result<SecretString, FetchError> {
        let guard = self.session.read();
        let session = guard
            .as_ref()
            .ok_or_else(|| FetchError::Unauthenticated("no active session".to_string()))?;

        if session.is_expired(Utc::now()) {
            return Err(FetchError::Unauthenticated("session expired".to_string()));
        }

        Ok(SecretString::new(session.token.expose_secret().clone()))
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.session.read();
        f.debug_struct("SessionStore")
            .field("role", &guard.as_ref().map(|s| s.role))
            .field("expires_at", &guard.as_ref().and_then(|s| s.expires_at))
            .field("token", &guard.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Fixed token, e.g. supplied on the command line
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Result<SecretString, FetchError> {
        let token = self.token.expose_secret();
        if token.trim().is_empty() {
            return Err(FetchError::Unauthenticated("empty token".to_string()));
        }
        Ok(SecretString::new(token.clone()))
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_lifecycle() {
        let store = SessionStore::new();
        assert!(matches!(store.bearer_token(), Err(FetchError::Unauthenticated(_))));
        assert!(!store.is_active());

        store.sign_in("tok-1", Role::Student, None);
        assert!(store.is_active());
        assert_eq!(store.role(), Some(Role::Student));
        assert_eq!(store.bearer_token().unwrap().expose_secret(), "tok-1");

        store.sign_out();
        assert!(!store.is_active());
        assert!(store.role().is_none());
        assert!(matches!(store.bearer_token(), Err(FetchError::Unauthenticated(_))));
    }

    #[test]
    fn test_expired_session_is_unauthenticated() {
        let store = SessionStore::new();
        store.sign_in("tok-1", Role::Staff, Some(Utc::now() - Duration::minutes(1)));

        assert!(!store.is_active());
        match store.bearer_token() {
            Err(FetchError::Unauthenticated(reason)) => assert_eq!(reason, "session expired"),
            other => panic!("expected expiry, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let store = SessionStore::new();
        store.sign_in("very-secret", Role::Staff, None);
        let rendered = format!("{:?}", store);
        assert!(!rendered.contains("very-secret"));
        assert!(format!("{:?}", StaticToken::new("very-secret")).contains("REDACTED"));
    }

    #[test]
    fn test_empty_static_token() {
        assert!(StaticToken::new("  ").bearer_token().is_err());
        assert!(StaticToken::new("abc").bearer_token().is_ok());
    }
}
