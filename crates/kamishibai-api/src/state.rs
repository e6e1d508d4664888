//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use kamishibai_core::clock::Clock;
use kamishibai_core::config::PlayerConfig;
use kamishibai_core::error::PlayerError;
use kamishibai_engine::application::session::PlaybackSession;
use kamishibai_engine::application::stage::HeadlessStage;
use kamishibai_scenario::application::loader::ScenarioSource;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Sessions untouched for this long are dropped by `sweep_idle`.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// A live session and the stage it renders to.
///
/// The mutex serialises input: one render at a time per session.
#[derive(Debug)]
pub struct SessionEntry {
    pub session: Mutex<PlaybackSession>,
    pub stage: Arc<HeadlessStage>,
    last_used: std::sync::Mutex<Instant>,
}

impl SessionEntry {
    #[must_use]
    pub fn new(session: PlaybackSession, stage: Arc<HeadlessStage>) -> Self {
        Self {
            session: Mutex::new(session),
            stage,
            last_used: std::sync::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_used.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(
            *self.last_used.lock().unwrap_or_else(PoisonError::into_inner),
        )
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Base player configuration; boot options are merged per session.
    pub config: Arc<PlayerConfig>,
    /// Time source for session timestamps.
    pub clock: Arc<dyn Clock>,
    /// Where scenario packs are loaded from.
    pub source: Arc<dyn ScenarioSource>,
    /// How long a session may go without requests before it is swept.
    pub idle_ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionEntry>>>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        config: PlayerConfig,
        clock: Arc<dyn Clock>,
        source: Arc<dyn ScenarioSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            clock,
            source,
            idle_ttl: DEFAULT_IDLE_TTL,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Replaces the idle timeout.
    #[must_use]
    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Looks up a live session.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::SessionNotFound` if no session has this ID.
    pub async fn session(&self, id: Uuid) -> Result<Arc<SessionEntry>, PlayerError> {
        let entry = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(PlayerError::SessionNotFound(id))?;
        entry.touch();
        Ok(entry)
    }

    /// Registers a session under its own ID, sweeping idle ones first.
    pub async fn insert(&self, entry: SessionEntry) -> Arc<SessionEntry> {
        self.sweep_idle().await;
        let id = entry.session.lock().await.id();
        let entry = Arc::new(entry);
        self.sessions.write().await.insert(id, Arc::clone(&entry));
        entry
    }

    /// Removes a session. It is dropped, cancelling its pending cues, once
    /// the last in-flight request releases it.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::SessionNotFound` if no session has this ID.
    pub async fn remove(&self, id: Uuid) -> Result<(), PlayerError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(PlayerError::SessionNotFound(id))
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for longer than `idle_ttl`. Returns how many
    /// were removed.
    pub async fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle_for(now) <= self.idle_ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "idle sessions swept");
        }
        removed
    }
}
