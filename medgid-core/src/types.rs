//! Core session types: user, chat, conversation phase, and per-session state.

use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Display name for logs: "First Last", falling back to username or id.
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self
                .username
                .clone()
                .unwrap_or_else(|| self.id.to_string()),
        }
    }
}

/// Chat identity. Private chats share the id with the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Conversation phase of one session. Every (phase, event) pair has a defined
/// transition; unrecognized input re-prompts without changing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No active flow; specialty selection works from here.
    #[default]
    Idle,
    /// Start menu shown; waiting for "find specialist" or "describe symptoms".
    AwaitingChoice,
    /// Waiting for free-text symptoms.
    AwaitingSymptoms,
    /// Triage done; waiting for the user to pick a recommended specialist.
    AwaitingSpecialistChoice,
}

/// Per-session conversation state, owned exclusively by the session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// Specialist display names recommended by the last triage run.
    pub recommended: Vec<String>,
}

impl SessionState {
    /// Resets to the start-menu state, dropping recommendations.
    pub fn reset_to_menu(&mut self) {
        self.phase = Phase::AwaitingChoice;
        self.recommended.clear();
    }
}
