use thiserror::Error;

/// Errors from the triage request. All of them abort the symptom flow; the
/// caller surfaces one user-facing message and returns the session to a safe
/// phase without retrying.
#[derive(Error, Debug)]
pub enum TriageError {
    /// Transport failure other than a timeout.
    #[error("Triage request failed: {0}")]
    Http(reqwest::Error),

    /// The request exceeded the client timeout. Kept separate from [`Self::Http`]
    /// for diagnostics.
    #[error("Triage request timed out")]
    Timeout,

    /// The completion service answered with a non-success status.
    #[error("Triage service returned status {status}")]
    UpstreamStatus { status: reqwest::StatusCode },

    /// Success status but no alternatives in the response envelope.
    #[error("Triage response carried no alternatives")]
    MissingAlternatives,
}

impl From<reqwest::Error> for TriageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

impl TriageError {
    /// The message shown to the user when this error aborts the symptom flow.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout => "Error: the request timed out.",
            Self::UpstreamStatus { .. } | Self::MissingAlternatives => {
                "Error: could not get recommendations."
            }
            Self::Http(_) => "Service error.",
        }
    }
}
