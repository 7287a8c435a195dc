//! # MedGid bot
//!
//! Wires the conversation router over medgid-directory and medgid-triage and
//! runs it against Telegram. The router only sees decoded [`SessionEvent`]s and
//! emits abstract [`Output`] payloads; the telegram module renders them
//! (keyboards, provider cards, progress edits) and owns the REPL.

pub mod config;
pub mod events;
pub mod output;
pub mod router;
pub mod session;
pub mod telegram;
pub mod users;

pub use config::BotConfig;
pub use events::SessionEvent;
pub use output::{Output, OutputPort};
pub use router::Router;
pub use session::SessionStore;
pub use telegram::{run_repl, TelegramRenderer};
pub use users::{UserProfile, UserRegistry};
