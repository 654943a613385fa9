use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use uuid::Uuid;

/// Authenticated admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    /// E-mail the session was opened with.
    pub email: String,
    /// Instant after which the token is rejected.
    pub expires_at: SystemTime,
}

/// Opaque session tokens issued at login.
pub struct SessionStore {
    sessions: DashMap<String, AdminSession>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store whose sessions live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session and return its token.
    pub fn create(&self, email: &str) -> (String, AdminSession) {
        let token = Uuid::new_v4().simple().to_string();
        let session = AdminSession {
            email: email.to_owned(),
            expires_at: SystemTime::now() + self.ttl,
        };
        self.sessions.insert(token.clone(), session.clone());
        (token, session)
    }

    /// Resolve a token, dropping it when expired.
    pub fn validate(&self, token: &str) -> Option<AdminSession> {
        let session = self.sessions.get(token).map(|entry| entry.clone())?;
        if session.expires_at <= SystemTime::now() {
            self.sessions.remove(token);
            return None;
        }
        Some(session)
    }

    /// Forget a token. Unknown tokens are ignored.
    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }
}
