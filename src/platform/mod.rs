//! Platform services for the review workflow
//!
//! The collector, the decision engine and the commit stage only talk to the
//! remote side through [`ReviewPlatform`], so tests can swap in a mock.

mod cleanup;
mod github;

pub use cleanup::clean_pr_body;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{Notification, PullRequest};
use async_trait::async_trait;

/// Remote operations consumed by the review pipeline
#[async_trait]
pub trait ReviewPlatform: Send + Sync {
    /// List recent notifications (paginated internally)
    ///
    /// Callers filter on [`Notification::is_review_request`].
    async fn list_review_notifications(&self) -> Result<Vec<Notification>>;

    /// Fetch a PR by number
    ///
    /// Returns `None` when the PR does not exist.
    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<PullRequest>>;

    /// Fetch the unified diff of a PR
    async fn get_diff(&self, pr: &PullRequest) -> Result<String>;

    /// Fetch the PR description, cleaned of generated boilerplate
    ///
    /// Errors when the description is empty.
    async fn get_pr_comment(&self, pr: &PullRequest) -> Result<String>;

    /// Whether `head_ref` is behind `base_ref`
    async fn is_branch_behind(
        &self,
        owner: &str,
        repo: &str,
        base_ref: &str,
        head_ref: &str,
    ) -> Result<bool>;

    /// Bring the PR branch up to date with its base
    async fn update_branch(&self, owner: &str, repo: &str, number: u64) -> Result<()>;

    /// Submit an approving review
    async fn create_approving_review(&self, owner: &str, repo: &str, number: u64) -> Result<()>;

    /// Enable squash auto-merge through the GraphQL API
    async fn enable_auto_merge(&self, node_id: &str) -> Result<()>;

    /// Squash-merge the PR immediately
    async fn squash_merge(&self, pr: &PullRequest) -> Result<()>;
}
