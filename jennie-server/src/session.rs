//! Session-scoped conversation storage.
//!
//! Each session id maps to one [`ConversationLog`], guarded by its own mutex so
//! concurrent requests on the same session cannot lose appends. The store-wide
//! map lock is only held long enough to look up or insert a handle.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Maximum number of turns kept per session (10 exchanges).
pub const MAX_HISTORY_TURNS: usize = 20;

/// Number of most recent turns rendered into the prompt (3 exchanges).
pub const CONTEXT_TURNS: usize = 6;

/// Session id used when the client does not send one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Line prefix used when rendering this role into a prompt.
    pub fn prompt_label(self) -> &'static str {
        match self {
            Role::User => "Me",
            Role::Assistant => "Assistant",
        }
    }
}

/// One immutable message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered turns of one session, bounded to [`MAX_HISTORY_TURNS`].
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: VecDeque<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            turns: VecDeque::with_capacity(MAX_HISTORY_TURNS + 2),
        }
    }

    /// Record a user message and the assistant reply to it, then evict the
    /// oldest exchanges until the log fits.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push_back(Turn::user(user));
        self.turns.push_back(Turn::assistant(assistant));
        while self.turns.len() > MAX_HISTORY_TURNS {
            self.turns.pop_front();
            self.turns.pop_front();
        }
    }

    /// Append arbitrary turns, then evict the oldest pair of head entries until
    /// the log fits. Pair-wise callers should prefer [`push_exchange`](Self::push_exchange):
    /// an odd number of turns here leaves the log at odd length.
    pub fn append(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.extend(turns);
        while self.turns.len() > MAX_HISTORY_TURNS {
            self.turns.pop_front();
            self.turns.pop_front();
        }
        if self.turns.len() % 2 != 0 {
            tracing::warn!(
                len = self.turns.len(),
                "Conversation log has odd length; user/assistant pairing is broken"
            );
        }
    }

    /// Clone the most recent `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Turn> {
        let start = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(start).cloned().collect()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Shared handle to one session's log.
pub type LogHandle = Arc<Mutex<ConversationLog>>;

/// In-process map from session id to conversation log.
///
/// Cloning is cheap and every clone sees the same sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, LogHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the log for `session_id`, creating and storing an empty one on miss.
    pub async fn get_or_create(&self, session_id: &str) -> LogHandle {
        if let Some(log) = self.sessions.read().await.get(session_id) {
            return Arc::clone(log);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| {
                    tracing::debug!(session_id = %session_id, "Creating conversation log");
                    Arc::new(Mutex::new(ConversationLog::new()))
                }),
        )
    }

    /// Append turns to a session's log (creating it if needed) and apply the size bound.
    pub async fn append_and_bound(&self, session_id: &str, turns: Vec<Turn>) {
        let log = self.get_or_create(session_id).await;
        log.lock().await.append(turns);
    }

    /// Remove a session entirely. Returns whether it existed.
    pub async fn delete(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Copy of a session's turns, or `None` if the session does not exist.
    pub async fn snapshot(&self, session_id: &str) -> Option<Vec<Turn>> {
        let log = self.sessions.read().await.get(session_id).cloned()?;
        let log = log.lock().await;
        Some(log.turns().cloned().collect())
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
