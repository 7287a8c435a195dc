use thiserror::Error;

/// Errors from the directory pipeline. Per-card extraction failures never
/// surface here; they degrade to sentinel fields or skip the one card.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Listing request failed (connect, TLS, timeout).
    #[error("Listing request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Listing responded with a non-success status.
    #[error("Listing returned status {0}")]
    UpstreamStatus(reqwest::StatusCode),

    /// No provider cards and no "no results" marker: the markup no longer
    /// matches the selector contract.
    #[error("Listing markup did not match selector contract v{0}")]
    Parse(u32),

    /// Cache file could not be written. Reads degrade to an empty cache
    /// instead of raising this.
    #[error("Cache write failed: {0}")]
    CacheIo(#[from] std::io::Error),
}

impl DirectoryError {
    /// True when the error came from the network rather than the markup.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::UpstreamStatus(_))
    }

    /// The message shown to the user when a lookup fails. The failure aborts
    /// only the current lookup, never the session.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "⚠️ Connection error.",
            Self::UpstreamStatus(_) => "⚠️ Could not load the doctors page.",
            Self::Parse(_) | Self::CacheIo(_) => "⚠️ Error while searching for doctors.",
        }
    }
}
