//! Abstract output payloads and the port they are emitted through.
//!
//! The router describes *what* to show; rendering (message text, keyboards,
//! photo cards, progress edits) happens entirely in the transport layer behind
//! [`OutputPort`]. Tests substitute a recording port.

use async_trait::async_trait;
use medgid_core::Chat;
use medgid_directory::{ProviderRecord, ScrapeProgress};

/// One renderable payload for a chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Greeting plus the start menu.
    Welcome,
    /// The full specialization keyboard.
    SpecializationList,
    /// First prompt for free-text symptoms.
    SymptomPrompt,
    /// Re-prompt after empty symptom text.
    SymptomsRetry,
    /// Triage has started; shown before the (slow) completion request.
    Analyzing,
    TriageSummary {
        diagnosis: String,
        specialists: Vec<String>,
    },
    /// Scrape checkpoint; rendered as one progress message edited in place.
    SearchProgress(ScrapeProgress),
    ProviderList {
        specialization: String,
        providers: Vec<ProviderRecord>,
        /// Recommendation keyboard to keep showing; empty → plain back-to-menu.
        recommended: Vec<String>,
    },
    NoProvidersFound {
        specialization: String,
    },
    /// User-facing failure text; the flow already returned to a safe phase.
    ServiceError(String),
    /// Re-prompt for unrecognized input.
    Guidance,
}

/// Sink for outputs, implemented by the Telegram renderer.
#[async_trait]
pub trait OutputPort: Send + Sync {
    async fn emit(&self, chat: &Chat, output: Output) -> medgid_core::Result<()>;
}
