//! Live game sessions, keyed by id.
//!
//! Each entry owns a [`SessionHandle`]; dropping the entry stops the
//! session task. Sessions nobody has touched for the configured idle
//! timeout are evicted by a background sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use plotguess_core::{spawn_session, SessionConfig, SessionHandle, SessionServices};

use crate::metrics::{SESSIONS_CREATED_TOTAL, SESSIONS_EVICTED_TOTAL};

struct SessionEntry {
    handle: SessionHandle,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

/// A session as seen by the API layer.
#[derive(Clone)]
pub struct SessionRef {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub handle: SessionHandle,
}

pub struct SessionRegistry {
    config: SessionConfig,
    services: SessionServices,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig, services: SessionServices) -> Self {
        Self {
            config,
            services,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new session.
    pub async fn create(&self) -> SessionRef {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let handle = spawn_session(self.config.clone(), self.services.clone());

        self.sessions.write().await.insert(
            id.clone(),
            SessionEntry {
                handle: handle.clone(),
                created_at: now,
                last_active: now,
            },
        );
        SESSIONS_CREATED_TOTAL.inc();
        info!("Session {} created", id);

        SessionRef {
            id,
            created_at: now,
            handle,
        }
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, id: &str) -> Option<SessionRef> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_active = Utc::now();
        Some(SessionRef {
            id: id.to_string(),
            created_at: entry.created_at,
            handle: entry.handle.clone(),
        })
    }

    /// End a session. Returns false if it did not exist.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!("Session {} removed", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for longer than the configured timeout as of `now`.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let idle_timeout = self.config.idle_timeout();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            let idle = (now - entry.last_active).to_std().unwrap_or_default();
            let keep = idle < idle_timeout && !entry.handle.is_closed();
            if !keep {
                debug!("Evicting session {} (idle {:?})", id, idle);
            }
            keep
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            SESSIONS_EVICTED_TOTAL.inc_by(evicted as u64);
            info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }

    /// Run [`evict_idle`](Self::evict_idle) every `interval`.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                registry.evict_idle(Utc::now()).await;
            }
        })
    }
}
