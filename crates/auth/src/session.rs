//! Server-side sessions keyed by an opaque cookie value.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use jobportal_core::UserId;

use crate::Role;

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Random (UUIDv4) session id; never derived from user data.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_cookie(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("session store unavailable: {0}")]
pub struct SessionStoreError(pub String);

pub type SessionStoreResult<T> = Result<T, SessionStoreError>;

/// Session persistence abstraction.
pub trait SessionStore: Send + Sync {
    fn insert(&self, id: SessionId, record: SessionRecord) -> SessionStoreResult<()>;
    fn get(&self, id: &SessionId) -> SessionStoreResult<Option<SessionRecord>>;
    /// Returns `true` if a session was removed.
    fn remove(&self, id: &SessionId) -> SessionStoreResult<bool>;
    /// Drop every session of a user (account deletion).
    fn remove_user(&self, user_id: UserId) -> SessionStoreResult<usize>;
    /// Drop every session created before `cutoff`.
    fn remove_created_before(&self, cutoff: DateTime<Utc>) -> SessionStoreResult<usize>;
}

/// In-memory session store for single-process deployments and tests.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> SessionStoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> SessionStoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> SessionStoreResult<RwLockReadGuard<'_, HashMap<SessionId, SessionRecord>>> {
        self.inner.read().map_err(|_| SessionStoreError("session lock poisoned".to_string()))
    }

    fn write(&self) -> SessionStoreResult<RwLockWriteGuard<'_, HashMap<SessionId, SessionRecord>>> {
        self.inner.write().map_err(|_| SessionStoreError("session lock poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, id: SessionId, record: SessionRecord) -> SessionStoreResult<()> {
        self.write()?.insert(id, record);
        Ok(())
    }

    fn get(&self, id: &SessionId) -> SessionStoreResult<Option<SessionRecord>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> SessionStoreResult<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    fn remove_user(&self, user_id: UserId) -> SessionStoreResult<usize> {
        let mut map = self.write()?;
        let before = map.len();
        map.retain(|_id, record| record.user_id != user_id);
        Ok(before - map.len())
    }

    fn remove_created_before(&self, cutoff: DateTime<Utc>) -> SessionStoreResult<usize> {
        let mut map = self.write()?;
        let before = map.len();
        map.retain(|_id, record| record.created_at >= cutoff);
        Ok(before - map.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: UserId) -> SessionRecord {
        record_at(user_id, Utc::now())
    }

    fn record_at(user_id: UserId, created_at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            user_id,
            role: Role::Jobseeker,
            created_at,
        }
    }

    #[test]
    fn insert_get_remove() {
        let store = InMemorySessionStore::new();
        let id = SessionId::generate();
        let user = UserId::new();
        store.insert(id.clone(), record(user)).unwrap();

        assert_eq!(store.get(&id).unwrap().map(|r| r.user_id), Some(user));
        assert!(store.remove(&id).unwrap());
        assert!(store.get(&id).unwrap().is_none());
        assert!(!store.remove(&id).unwrap());
    }

    #[test]
    fn remove_user_drops_all_sessions_of_that_user() {
        let store = InMemorySessionStore::new();
        let user = UserId::new();
        store.insert(SessionId::generate(), record(user)).unwrap();
        store.insert(SessionId::generate(), record(user)).unwrap();
        store.insert(SessionId::generate(), record(UserId::new())).unwrap();

        assert_eq!(store.remove_user(user).unwrap(), 2);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn sessions_older_than_cutoff_are_dropped() {
        let store = InMemorySessionStore::new();
        let now = Utc::now();
        let fresh = SessionId::generate();
        store.insert(SessionId::generate(), record_at(UserId::new(), now - chrono::Duration::hours(2))).unwrap();
        store.insert(fresh.clone(), record_at(UserId::new(), now)).unwrap();

        assert_eq!(store.remove_created_before(now - chrono::Duration::hours(1)).unwrap(), 1);
        assert!(store.get(&fresh).unwrap().is_some());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn poisoned_lock_surfaces_as_error() {
        let store = std::sync::Arc::new(InMemorySessionStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.write().unwrap();
            panic!("poison the session lock");
        })
        .join();

        assert!(store.insert(SessionId::generate(), record(UserId::new())).is_err());
        assert!(store.get(&SessionId::generate()).is_err());
    }
}
