//! Error types for hunk-review

use thiserror::Error;

/// Errors surfaced by the collector, the decision engine and the platform layer
#[derive(Debug, Error)]
pub enum Error {
    /// No usable credentials were found
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Listing pending review notifications failed
    #[error("failed to list review notifications: {0}")]
    Notifications(String),

    /// Resolving one notification into a fingerprinted PR failed
    ///
    /// Aborts the whole collection batch.
    #[error("failed to resolve {subject} ({step}): {message}")]
    Resolution {
        /// Affected subject, e.g. `owner/repo#12`
        subject: String,
        /// Sub-step that failed
        step: &'static str,
        /// Underlying error text
        message: String,
    },

    /// The operator input source failed (not malformed input, which is re-prompted)
    #[error("input error: {0}")]
    Input(String),

    /// Configuration could not be read or written
    #[error("config error: {0}")]
    Config(String),

    /// GitHub API error with context
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform error
    #[error("platform error: {0}")]
    Platform(String),

    /// Error from octocrab
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// Internal invariant broken
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a [`Error::Resolution`] for `subject` failing at `step`
    pub fn resolution(
        subject: impl Into<String>,
        step: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Resolution {
            subject: subject.into(),
            step,
            message: err.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
