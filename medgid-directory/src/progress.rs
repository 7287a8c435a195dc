//! Scrape progress reporting.
//!
//! A scrape takes seconds; callers get checkpoint notifications through a boxed
//! async callback so a long-running fetch is never silent. Delivery is
//! best-effort: the callback returns `()` and the scraper never fails because a
//! progress update could not be shown.

use std::future::Future;
use std::pin::Pin;

/// Checkpoints reported during one scrape, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeProgress {
    /// Request is about to be sent.
    Connecting,
    /// Page body received.
    PageLoaded,
    /// Provider cards located on the page.
    CardsLocated(usize),
    /// One card extracted. `index` is 1-based.
    CardProcessed { index: usize, total: usize },
    /// Scrape finished (with or without results).
    Complete,
}

impl ScrapeProgress {
    /// Maps a checkpoint to a 0–100 percentage for progress displays.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Connecting => 10,
            Self::PageLoaded => 40,
            Self::CardsLocated(_) => 70,
            Self::CardProcessed { index, total } => {
                let total = (*total).max(1);
                80 + (15 * index / total) as u8
            }
            Self::Complete => 100,
        }
    }
}

/// Type-erased async progress callback, mirroring the boxed stream-chunk
/// callback shape used by the LLM client seam.
pub type ProgressCallback =
    dyn FnMut(ScrapeProgress) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send;

/// A callback that drops every checkpoint. Useful in tests and cache-only paths.
pub fn silent() -> Box<ProgressCallback> {
    Box::new(|_| Box::pin(async {}))
}
