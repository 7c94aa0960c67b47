//! Session persistence. The engine only sees `SessionStore`.

pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{InterviewSession, SessionStatus};

pub use postgres::PgSessionStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError>;

    /// Inserts or replaces the whole session in one write. Replacing is only
    /// allowed while the stored copy is still `in-progress`; otherwise the
    /// write is dropped and `AppError::InvalidState` returned.
    async fn save(&self, session: &InterviewSession) -> Result<(), AppError>;
}

fn no_longer_in_progress(id: Uuid) -> AppError {
    AppError::InvalidState(format!("Interview session {id} is no longer in progress"))
}

/// Process-local store for development and tests. Lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, InterviewSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save(&self, session: &InterviewSession) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        if let Some(stored) = sessions.get(&session.id) {
            if stored.status != SessionStatus::InProgress {
                return Err(no_longer_in_progress(session.id));
            }
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::fixtures::new_session;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        let session = new_session(6);
        assert!(store.load(session.id).await.unwrap().is_none());

        store.save(&session).await.unwrap();
        assert_eq!(store.load(session.id).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_memory_store_save_replaces() {
        let store = MemorySessionStore::new();
        let mut session = new_session(6);
        store.save(&session).await.unwrap();

        session.abandon().unwrap();
        store.save(&session).await.unwrap();

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, session.status);
    }

    #[tokio::test]
    async fn test_memory_store_refuses_stale_write_after_abandon() {
        let store = MemorySessionStore::new();
        let stale = new_session(6);
        store.save(&stale).await.unwrap();

        let mut abandoned = stale.clone();
        abandoned.abandon().unwrap();
        store.save(&abandoned).await.unwrap();

        let err = store.save(&stale).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        let loaded = store.load(stale.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Abandoned);
    }
}
