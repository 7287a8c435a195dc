//! In-memory session store, keyed by chat id.
//!
//! State lives only for the process lifetime; there is no durability
//! requirement for conversations.

use std::collections::HashMap;

use medgid_core::{Phase, SessionState};
use tokio::sync::Mutex;

/// Mutex-guarded map of chat id → [`SessionState`]. A chat with no entry is in
/// the default (Idle) state.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session, default when absent.
    pub async fn get(&self, chat_id: i64) -> SessionState {
        self.sessions
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set(&self, chat_id: i64, state: SessionState) {
        self.sessions.lock().await.insert(chat_id, state);
    }

    pub async fn set_phase(&self, chat_id: i64, phase: Phase) {
        self.sessions.lock().await.entry(chat_id).or_default().phase = phase;
    }

    /// Back to the start menu, recommendations dropped.
    pub async fn reset_to_menu(&self, chat_id: i64) {
        self.sessions
            .lock()
            .await
            .entry(chat_id)
            .or_default()
            .reset_to_menu();
    }

    /// Clears the session entirely (Idle, nothing remembered).
    pub async fn clear(&self, chat_id: i64) {
        self.sessions.lock().await.remove(&chat_id);
    }
}
