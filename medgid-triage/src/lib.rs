//! # medgid-triage
//!
//! Symptom triage: one synchronous completion request to an external
//! natural-language service, parsed against a fixed output grammar into a
//! diagnosis summary and a list of specialist names guaranteed to exist in the
//! specialization registry.
//!
//! The [`TriageClient`] trait is the seam the conversation layer depends on;
//! [`CompletionTriageClient`] is the production implementation.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;

pub use client::CompletionTriageClient;
pub use error::TriageError;
pub use parse::parse_reply;
pub use prompt::build_prompt;

/// Result of one triage run. `specialists` is never empty: parsing falls back
/// to the registry's default specialist when nothing valid is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageOutcome {
    pub diagnosis: String,
    pub specialists: Vec<String>,
}

/// Analyzes free-text symptoms into a [`TriageOutcome`].
#[async_trait]
pub trait TriageClient: Send + Sync {
    async fn analyze(&self, symptoms: &str) -> Result<TriageOutcome, TriageError>;
}
