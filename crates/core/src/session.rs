//! In-memory session cache.
//!
//! Maps opaque session tokens to logged-in account ids. Tokens exist only in
//! memory: a process restart logs everyone out, which is acceptable for this
//! service and keeps the store free of session rows.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One logged-in principal.
#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: i64,
    pub started_at: DateTime<Utc>,
}

/// Token-keyed session store.
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: HashMap<String, Session>,
}

impl SessionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `account_id` and returns the fresh token.
    pub fn start(&mut self, account_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                account_id,
                started_at: Utc::now(),
            },
        );
        token
    }

    /// Resolves a token to the logged-in account id.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        self.sessions.get(token).map(|s| s.account_id)
    }

    /// Ends the session for `token`. Returns whether one existed.
    pub fn end(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drops every session.
    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Session cache as shared between request handlers.
pub type SharedSessionCache = Arc<RwLock<SessionCache>>;

/// Creates an empty shared cache.
pub fn shared_session_cache() -> SharedSessionCache {
    Arc::new(RwLock::new(SessionCache::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_resolve_end_cycle() {
        let mut cache = SessionCache::new();
        let token = cache.start(42);
        assert_eq!(cache.resolve(&token), Some(42));
        assert!(cache.end(&token));
        assert_eq!(cache.resolve(&token), None);
        assert!(!cache.end(&token), "ending twice should report no session");
    }

    #[test]
    fn test_tokens_are_unique_per_login() {
        let mut cache = SessionCache::new();
        let a = cache.start(1);
        let b = cache.start(1);
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2, "the same account may hold two sessions");
    }

    #[test]
    fn test_unknown_token_does_not_resolve() {
        let cache = SessionCache::new();
        assert_eq!(cache.resolve("deadbeef"), None);
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut cache = SessionCache::new();
        cache.start(1);
        cache.start(2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
