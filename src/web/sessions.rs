//! # Session Store
//!
//! Live chat sessions keyed by id. Uses DashMap for concurrent access across
//! request handlers; each session sits behind its own async mutex so one
//! session's submissions run one at a time while sessions stay independent.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Session cap with least-recently-active eviction
//! - 1.0.0: Initial release with idle eviction

use chrono::{Duration, Utc};
use dashmap::DashMap;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::config::DEFAULT_MAX_SESSIONS;
use crate::features::chat::ChatSession;
use crate::features::personas::PersonaConfig;

pub type SharedSession = Arc<Mutex<ChatSession>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SharedSession>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Create and register a session for a fresh page load.
    ///
    /// At the cap, the least recently active idle session is dropped first.
    /// The cap is soft: when every session is mid-submission, or page loads
    /// race, the store briefly holds more.
    pub fn create(&self, persona: PersonaConfig) -> Uuid {
        if self.sessions.len() >= self.max_sessions {
            self.evict_least_recent();
        }

        let session = ChatSession::new(persona);
        let id = session.id;
        let persona_id = session.persona.id;
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        info!(
            "[{id}] Session created | Persona: {persona_id} | Active: {}/{}",
            self.sessions.len(),
            self.max_sessions
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than `max_idle`.
    ///
    /// Sessions locked by an in-flight submission are busy, not idle, and are
    /// kept.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();

        self.sessions.retain(|id, session| match session.try_lock() {
            Ok(guard) => {
                let keep = guard.last_active > cutoff;
                if !keep {
                    info!("[{id}] Session evicted | Idle since: {}", guard.last_active);
                }
                keep
            }
            Err(_) => true,
        });

        before.saturating_sub(self.sessions.len())
    }

    fn evict_least_recent(&self) -> Option<Uuid> {
        let oldest = self
            .sessions
            .iter()
            .filter_map(|entry| {
                let guard = entry.value().try_lock().ok()?;
                Some((*entry.key(), guard.last_active))
            })
            .min_by_key(|(_, last_active)| *last_active)
            .map(|(id, _)| id);

        match oldest {
            Some(id) => {
                self.sessions.remove(&id);
                warn!(
                    "[{id}] Session evicted | Store at cap of {} sessions",
                    self.max_sessions
                );
                Some(id)
            }
            None => {
                warn!(
                    "Session store at cap of {} with every session busy",
                    self.max_sessions
                );
                None
            }
        }
    }
}
