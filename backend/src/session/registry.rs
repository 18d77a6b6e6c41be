//! Registry of open editing sessions keyed by id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::EditingSession;
use crate::errors::AppError;
use crate::models::PublishedContent;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<EditingSession>>;

struct Entry {
    handle: SessionHandle,
    last_access: Instant,
}

impl Entry {
    /// Idle past the ttl and not in the middle of a request or a publish.
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        if now.duration_since(self.last_access) < ttl {
            return false;
        }
        match self.handle.try_lock() {
            Ok(session) => !session.is_saving(),
            Err(_) => false,
        }
    }
}

/// Open sessions. Each one is independent; only the content store is shared.
///
/// Sessions idle for longer than the ttl are dropped the next time a session
/// is opened or looked up.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Open a session over freshly loaded content.
    pub async fn open(&self, published: PublishedContent) -> (Uuid, SessionHandle) {
        let session = EditingSession::initialize(published);
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);
        sessions.insert(
            id,
            Entry {
                handle: Arc::clone(&handle),
                last_access: now,
            },
        );
        tracing::info!(session_id = %id, open_sessions = sessions.len(), "Opened editing session");
        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        entry.last_access = now;
        Ok(Arc::clone(&entry.handle))
    }

    pub async fn close(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                tracing::info!(session_id = %id, "Closed editing session");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {} not found", id))),
        }
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let expired = entry.is_expired(now, self.ttl);
            if expired {
                tracing::info!(session_id = %id, "Evicted idle editing session");
            }
            !expired
        });
        if sessions.len() != before {
            tracing::debug!(open_sessions = sessions.len(), "Evicted idle sessions");
        }
    }
}
