//! Telegram layer: teloxide adapters, keyboards, the [`OutputPort`] renderer,
//! and the REPL runner. Nothing above this module touches teloxide types.
//!
//! [`OutputPort`]: crate::output::OutputPort

mod adapters;
mod keyboards;
mod renderer;
mod runner;

pub use adapters::{to_core_chat, to_core_user};
pub use renderer::TelegramRenderer;
pub use runner::run_repl;
