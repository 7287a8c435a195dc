//! # medgid-core
//!
//! Core types and errors for the MedGid bot: [`User`], [`Chat`], the conversation
//! [`Phase`] and per-session [`SessionState`], and tracing initialization.
//! Transport-agnostic; used by medgid-directory, medgid-triage, and medgid-bot.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{CoreError, Result};
pub use logger::init_tracing;
pub use types::{Chat, Phase, SessionState, User};
