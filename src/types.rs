//! Core types for hunk-review

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification reason GitHub uses for pending review requests
pub const REVIEW_REQUESTED: &str = "review_requested";

/// A pending notification from the GitHub notification feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification thread ID
    pub id: String,
    /// Why the notification was delivered (e.g. `review_requested`)
    pub reason: String,
    /// Owner of the repository the subject lives in
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Subject title (PR title at notification time)
    pub subject_title: String,
    /// Subject type (`PullRequest`, `Issue`, ...)
    pub subject_type: String,
    /// API URL of the subject, e.g. `https://api.github.com/repos/o/r/pulls/12`
    pub subject_url: Option<String>,
    /// Last update of the notification thread
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Whether this notification asks for a review
    pub fn is_review_request(&self) -> bool {
        self.reason == REVIEW_REQUESTED
    }

    /// `owner/repo` label used in messages
    pub fn repo_label(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// PR number parsed from the subject URL (`.../pulls/<n>`)
    pub fn pr_number(&self) -> Option<u64> {
        let raw = self.subject_url.as_deref()?;
        let parsed = url::Url::parse(raw).ok()?;
        let mut segments = parsed.path_segments()?;
        segments.find(|s| *s == "pulls")?;
        segments.next()?.parse().ok()
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open and awaiting review
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request awaiting review
///
/// Identity is the web URL: two values with the same `html_url` are the same PR.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Owner of the base repository
    pub owner: String,
    /// Base repository name
    pub repo: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// GraphQL node ID (used for the auto-merge mutation)
    pub node_id: Option<String>,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// Login of the PR author
    pub author: String,
    /// Current state of the PR
    pub state: PrState,
}

impl PullRequest {
    /// Whether the PR is still open
    pub fn is_open(&self) -> bool {
        self.state == PrState::Open
    }

    /// `owner/repo#number` label used in messages
    pub fn label(&self) -> String {
        format!("{}/{}#{}", self.owner, self.repo, self.number)
    }
}
