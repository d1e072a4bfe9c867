//! In-process registry of issued chat session ids.
//!
//! The registry lives only as long as the server process. After a restart
//! it is empty, so cookies from a previous run are rejected and the browser
//! has to load the page again to get a fresh session.
//!
//! The registry is bounded two ways: an id unused for longer than the idle
//! timeout is forgotten, and once `max_sessions` ids are held the least
//! recently used one is evicted to make room for a new one.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tracing::debug;

use simplechat_types::chat::SessionId;

/// Default upper bound on ids held at once.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default time an id survives without a page load or chat request.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Concurrent map of active session ids to the time they were last used.
#[derive(Debug)]
pub struct SessionRegistry {
    active: DashMap<SessionId, DateTime<Utc>>,
    max_sessions: usize,
    idle_timeout: TimeDelta,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_TIMEOUT)
    }

    /// Registry holding at most `max_sessions` ids (minimum 1), each
    /// forgotten after `idle_timeout` without use.
    pub fn with_limits(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            active: DashMap::new(),
            max_sessions: max_sessions.max(1),
            idle_timeout: TimeDelta::from_std(idle_timeout).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Issue a new session id, retiring the one the browser presented.
    ///
    /// A page load always starts a new, empty conversation. Rows stored
    /// under the retired id stay in the database but are no longer reachable
    /// from the browser.
    pub fn issue(&self, previous: Option<&SessionId>) -> SessionId {
        if let Some(previous) = previous {
            if self.active.remove(previous).is_some() {
                debug!(session_id = %previous, "Retired chat session");
            }
        }

        let now = Utc::now();
        self.purge_idle(now);
        while self.active.len() >= self.max_sessions {
            if !self.evict_least_recent() {
                break;
            }
        }

        let id = SessionId::generate();
        self.active.insert(id, now);
        debug!(session_id = %id, "Issued chat session");
        id
    }

    /// Whether `id` was issued by this process, has not been retired and
    /// has not sat idle past the timeout. A successful check counts as use.
    pub fn is_active(&self, id: &SessionId) -> bool {
        let now = Utc::now();
        match self.active.get_mut(id) {
            Some(mut last_seen) if now - *last_seen <= self.idle_timeout => {
                *last_seen = now;
                return true;
            }
            Some(_) => {}
            None => return false,
        }

        if self
            .active
            .remove_if(id, |_, last_seen| now - *last_seen > self.idle_timeout)
            .is_some()
        {
            debug!(session_id = %id, "Expired idle chat session");
        }
        false
    }

    /// When `id` was last used, if it is held.
    pub fn last_seen(&self, id: &SessionId) -> Option<DateTime<Utc>> {
        self.active.get(id).map(|entry| *entry.value())
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn purge_idle(&self, now: DateTime<Utc>) {
        let before = self.active.len();
        self.active
            .retain(|_, last_seen| now - *last_seen <= self.idle_timeout);
        let purged = before.saturating_sub(self.active.len());
        if purged > 0 {
            debug!(purged, "Expired idle chat sessions");
        }
    }

    fn evict_least_recent(&self) -> bool {
        let oldest = self
            .active
            .iter()
            .min_by_key(|entry| *entry.value())
            .map(|entry| *entry.key());

        match oldest {
            Some(id) => {
                self.active.remove(&id);
                debug!(session_id = %id, "Evicted least recently used chat session");
                true
            }
            None => false,
        }
    }
}
