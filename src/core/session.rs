//! Per-browser session state
//!
//! Every browser gets its own [`Session`], keyed by the id in its session
//! cookie. A session is created on the first request that carries no (or an
//! unknown, or an expired) id, and is discarded once it has been idle longer
//! than the configured TTL.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::conversation::Conversation;

/// State carried between requests for one browser
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub conversation: Conversation,
    /// Text pre-filled into the input box on the next render
    pub pending_input: String,
    /// Last width reported by the viewport script
    pub viewport_width: Option<u32>,
}

impl Session {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation: Conversation::initialize(system_prompt),
            pending_input: String::new(),
            viewport_width: None,
        }
    }
}

/// Shared handle to one session; holding its lock serialises that browser's
/// requests.
pub type SessionSlot = Arc<Mutex<Session>>;

struct Entry {
    slot: SessionSlot,
    last_seen: DateTime<Utc>,
}

impl Entry {
    /// A session whose slot is locked has a request in flight and is never
    /// considered idle, however long that request takes.
    fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_seen <= ttl || self.slot.try_lock().is_err()
    }
}

/// In-memory session table
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    ttl: Duration,
    system_prompt: String,
}

impl SessionStore {
    pub fn new(system_prompt: impl Into<String>, ttl: std::time::Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::weeks(5200)),
            system_prompt: system_prompt.into(),
        }
    }

    /// Look up the session for `id`, creating a fresh one when the id is
    /// missing, unknown, or expired.
    pub async fn acquire(&self, id: Option<Uuid>) -> (Uuid, SessionSlot) {
        self.acquire_at(id, Utc::now()).await
    }

    async fn acquire_at(&self, id: Option<Uuid>, now: DateTime<Utc>) -> (Uuid, SessionSlot) {
        let mut sessions = self.sessions.lock().await;

        if let Some(id) = id {
            match sessions.get_mut(&id) {
                Some(entry) if entry.is_live(now, self.ttl) => {
                    entry.last_seen = now;
                    return (id, entry.slot.clone());
                }
                Some(_) => {
                    sessions.remove(&id);
                    tracing::debug!(session = %id, "Session expired");
                }
                None => {
                    tracing::debug!(session = %id, "Unknown session id");
                }
            }
        }

        let session = Session::new(&self.system_prompt);
        let id = session.id;
        let slot = Arc::new(Mutex::new(session));
        sessions.insert(
            id,
            Entry {
                slot: slot.clone(),
                last_seen: now,
            },
        );
        tracing::debug!(session = %id, active = sessions.len(), "Session created");
        (id, slot)
    }

    /// Mark `id` as active now. Called when a request finishes, so a slow
    /// provider call does not eat into the idle allowance.
    pub async fn touch(&self, id: Uuid) {
        self.touch_at(id, Utc::now()).await
    }

    async fn touch_at(&self, id: Uuid, now: DateTime<Utc>) {
        if let Some(entry) = self.sessions.lock().await.get_mut(&id) {
            entry.last_seen = now;
        }
    }

    /// Drop every session idle longer than the TTL. Returns how many went.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(now, self.ttl));
        before - sessions.len()
    }

    /// Run [`SessionStore::sweep`] every `every` until the runtime shuts down
    pub fn spawn_sweeper(self: Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = self.sweep().await;
                if removed > 0 {
                    let active = self.len().await;
                    tracing::debug!(removed, active, "Expired idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    fn store() -> SessionStore {
        SessionStore::new("guide", std::time::Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_new_session_starts_with_system_prompt() {
        let store = store();
        let (_, slot) = store.acquire(None).await;
        let session = slot.lock().await;
        assert_eq!(session.conversation.len(), 1);
        assert_eq!(session.conversation.messages()[0].role, Role::System);
        assert!(session.pending_input.is_empty());
    }

    #[tokio::test]
    async fn test_same_id_returns_same_session() {
        let store = store();
        let (id, slot) = store.acquire(None).await;
        slot.lock().await.pending_input = "Goa".into();

        let (again, slot) = store.acquire(Some(id)).await;
        assert_eq!(again, id);
        assert_eq!(slot.lock().await.pending_input, "Goa");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_gets_fresh_session() {
        let store = store();
        let stranger = Uuid::new_v4();
        let (id, _) = store.acquire(Some(stranger)).await;
        assert_ne!(id, stranger);
    }

    #[tokio::test]
    async fn test_expired_session_is_replaced() {
        let store = store();
        let start = Utc::now();
        let (id, slot) = store.acquire_at(None, start).await;
        slot.lock().await.pending_input = "old".into();

        let later = start + Duration::seconds(61);
        let (fresh, slot) = store.acquire_at(Some(id), later).await;
        assert_ne!(fresh, id);
        assert!(slot.lock().await.pending_input.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_activity_extends_session() {
        let store = store();
        let start = Utc::now();
        let (id, _) = store.acquire_at(None, start).await;
        let (same, _) = store.acquire_at(Some(id), start + Duration::seconds(50)).await;
        assert_eq!(same, id);
        let (same, _) = store.acquire_at(Some(id), start + Duration::seconds(100)).await;
        assert_eq!(same, id);
    }

    #[tokio::test]
    async fn test_sweep_removes_idle_sessions() {
        let store = store();
        let start = Utc::now();
        store.acquire_at(None, start).await;
        store.acquire_at(None, start + Duration::seconds(30)).await;

        assert_eq!(store.sweep_at(start + Duration::seconds(70)).await, 1);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.sweep_at(start + Duration::seconds(200)).await, 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_session_with_request_in_flight() {
        let store = store();
        let start = Utc::now();
        let (id, slot) = store.acquire_at(None, start).await;
        let guard = slot.lock().await;

        let later = start + Duration::seconds(600);
        assert_eq!(store.sweep_at(later).await, 0);
        assert_eq!(store.len().await, 1);

        // A second request for the same browser still finds the session
        let (same, _) = store.acquire_at(Some(id), later).await;
        assert_eq!(same, id);

        drop(guard);
        assert_eq!(store.sweep_at(later + Duration::seconds(61)).await, 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_exchange_finished_after_ttl_is_kept() {
        let store = store();
        let start = Utc::now();
        let (id, slot) = store.acquire_at(None, start).await;

        let mut guard = slot.lock().await;
        store.sweep_at(start + Duration::seconds(120)).await;
        guard.conversation.add_user("Q");
        guard.conversation.add_assistant("A");
        store.touch_at(id, start + Duration::seconds(120)).await;
        drop(guard);

        let (same, slot) = store.acquire_at(Some(id), start + Duration::seconds(150)).await;
        assert_eq!(same, id);
        assert_eq!(slot.lock().await.conversation.len(), 3);
    }

    #[tokio::test]
    async fn test_sweeper_task_purges_idle_sessions() {
        let store = Arc::new(SessionStore::new("guide", std::time::Duration::ZERO));
        store.acquire(None).await;
        assert_eq!(store.len().await, 1);

        let handle = store.clone().spawn_sweeper(std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_touch_ignores_unknown_id() {
        let store = store();
        store.touch(Uuid::new_v4()).await;
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn test_sweep_on_empty_store() {
        let store = store();
        assert_eq!(tokio_test::block_on(store.sweep()), 0);
    }
}
