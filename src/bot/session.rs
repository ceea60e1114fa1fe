//! In-memory session store: user id -> active conversation.
//!
//! A session exists if and only if the user is mid-collection; absence means
//! IDLE. Process restart loses all in-flight conversations, and mid-conversation
//! users must re-issue /start.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::bot::collector::Collector;

/// One user's in-progress conversation. Owns the stateful collector.
pub struct UserSession {
    pub collector: Box<dyn Collector>,
}

impl UserSession {
    pub fn new(collector: Box<dyn Collector>) -> Self {
        Self { collector }
    }
}

/// Process-wide mapping from user id to active session.
///
/// `take`/`put` rather than a borrowing `get` so the engine can mutate the
/// collector without holding a store guard across awaits. A concurrent
/// duplicate update for the same user observes an absent session.
pub trait SessionStore: Send + Sync {
    /// Remove and return the user's session, if any.
    fn take(&self, user_id: i64) -> Option<UserSession>;

    /// Install a session, replacing any existing one.
    fn put(&self, user_id: i64, session: UserSession);

    /// Drop the user's session. Returns whether one existed.
    fn remove(&self, user_id: i64) -> bool;

    fn contains(&self, user_id: i64) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<i64, UserSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, UserSession>> {
        self.sessions.lock().expect("session store lock poisoned")
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn take(&self, user_id: i64) -> Option<UserSession> {
        self.lock().remove(&user_id)
    }

    fn put(&self, user_id: i64, session: UserSession) {
        self.lock().insert(user_id, session);
    }

    fn remove(&self, user_id: i64) -> bool {
        self.lock().remove(&user_id).is_some()
    }

    fn contains(&self, user_id: i64) -> bool {
        self.lock().contains_key(&user_id)
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
