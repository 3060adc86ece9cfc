//! Per-session chat history with idle expiry
//!
//! Each session keeps a bounded FIFO of messages. A session idle for longer
//! than the TTL is forgotten on the next read or write of any session, or
//! on `sweep`.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::types::ChatMessage;

/// Default idle lifetime of a session (30 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default number of messages kept per session
pub const DEFAULT_MAX_MESSAGES: usize = 20;

#[derive(Debug)]
struct Session {
    history: VecDeque<ChatMessage>,
    last_access: Instant,
}

/// History store keyed by session id
#[derive(Debug)]
pub struct ChatSessions {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
    max_messages: usize,
}

impl Default for ChatSessions {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_MESSAGES)
    }
}

impl ChatSessions {
    pub fn new(ttl: Duration, max_messages: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_messages: max_messages.max(2),
        }
    }

    /// Fresh random session id
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Messages of a live session, oldest first; empty if unknown or expired
    pub async fn history(&self, id: &str) -> Vec<ChatMessage> {
        self.history_at(id, Instant::now()).await
    }

    pub(crate) async fn history_at(&self, id: &str, now: Instant) -> Vec<ChatMessage> {
        let mut sessions = self.sessions.lock().await;
        self.evict_expired(&mut sessions, now);

        match sessions.get_mut(id) {
            Some(session) => {
                session.last_access = now;
                session.history.iter().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Append one exchange, dropping the oldest messages past the bound
    pub async fn record(&self, id: &str, user: ChatMessage, assistant: ChatMessage) {
        self.record_at(id, user, assistant, Instant::now()).await
    }

    pub(crate) async fn record_at(
        &self,
        id: &str,
        user: ChatMessage,
        assistant: ChatMessage,
        now: Instant,
    ) {
        let mut sessions = self.sessions.lock().await;
        self.evict_expired(&mut sessions, now);

        let session = sessions.entry(id.to_string()).or_insert_with(|| Session {
            history: VecDeque::with_capacity(self.max_messages),
            last_access: now,
        });

        session.history.push_back(user);
        session.history.push_back(assistant);
        while session.history.len() > self.max_messages {
            session.history.pop_front();
        }
        session.last_access = now;
    }

    /// Forget a session
    pub async fn clear(&self, id: &str) -> bool {
        self.sessions.lock().await.remove(id).is_some()
    }

    /// Drop every expired session, returning how many went
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    pub(crate) async fn sweep_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.evict_expired(&mut sessions, now)
    }

    /// Sessions currently held, expired or not
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Every read or write drops all idle sessions, not just the one touched
    fn evict_expired(&self, sessions: &mut HashMap<String, Session>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.last_access) <= self.ttl);

        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "evicted expired chat sessions");
        }
        removed
    }
}
