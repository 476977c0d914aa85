//! Mock review platform for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use hunk_review::error::{Error, Result};
use hunk_review::platform::ReviewPlatform;
use hunk_review::types::{Notification, PullRequest};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Call record for `update_branch` / `create_approving_review`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrCall {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// Simple mock review platform
///
/// Hand-written rather than generated so tests can inspect call order and
/// inject failures per PR.
///
/// Features:
/// - Canned notifications, PRs and diffs
/// - Call tracking for verification
/// - Error injection for failure path testing
/// - Optional per-call delay and in-flight tracking for concurrency tests
#[derive(Default)]
pub struct MockReviewPlatform {
    notifications: Mutex<Vec<Notification>>,
    /// `owner/repo#n` → PR
    pull_requests: Mutex<HashMap<String, PullRequest>>,
    /// PR URL → diff text
    diffs: Mutex<HashMap<String, String>>,
    /// PR URL → description
    comments: Mutex<HashMap<String, String>>,
    /// PR URLs whose head branch is behind
    behind: Mutex<HashSet<String>>,
    // Call tracking
    get_pr_calls: Mutex<Vec<String>>,
    get_diff_calls: Mutex<Vec<String>>,
    get_comment_calls: Mutex<Vec<String>>,
    is_behind_calls: Mutex<Vec<(String, String)>>,
    update_branch_calls: Mutex<Vec<PrCall>>,
    approve_calls: Mutex<Vec<PrCall>>,
    auto_merge_calls: Mutex<Vec<String>>,
    squash_merge_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_notifications: Mutex<Option<String>>,
    error_on_get_pr: Mutex<HashSet<u64>>,
    error_on_diff: Mutex<HashSet<String>>,
    error_on_comment: Mutex<HashSet<String>>,
    error_on_is_behind: Mutex<Option<String>>,
    error_on_update_branch: Mutex<Option<String>>,
    error_on_approve: Mutex<HashSet<u64>>,
    error_on_auto_merge: Mutex<Option<String>>,
    error_on_squash_merge: Mutex<Option<String>>,
    // Concurrency observation
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn pr_key(owner: &str, repo: &str, number: u64) -> String {
    format!("{owner}/{repo}#{number}")
}

impl MockReviewPlatform {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    // === Setup ===

    /// Add a PR, its diff, and a review-request notification for it
    pub fn add_review_request(&self, pr: PullRequest, diff: &str) {
        let notification = super::make_notification(&pr);
        self.notifications.lock().unwrap().push(notification);
        self.add_pull_request(pr, diff);
    }

    /// Add a PR and its diff without a notification
    pub fn add_pull_request(&self, pr: PullRequest, diff: &str) {
        self.diffs
            .lock()
            .unwrap()
            .insert(pr.html_url.clone(), diff.to_string());
        self.pull_requests
            .lock()
            .unwrap()
            .insert(pr_key(&pr.owner, &pr.repo, pr.number), pr);
    }

    /// Add a raw notification
    pub fn add_notification(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    /// Set the description returned by `get_pr_comment`
    pub fn set_comment(&self, pr_url: &str, body: &str) {
        self.comments
            .lock()
            .unwrap()
            .insert(pr_url.to_string(), body.to_string());
    }

    /// Report the PR branch as behind its base
    pub fn set_behind(&self, pr_url: &str) {
        self.behind.lock().unwrap().insert(pr_url.to_string());
    }

    /// Delay every fetch call
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    // === Error injection methods ===

    /// Make `list_review_notifications` return an error
    pub fn fail_notifications(&self, msg: &str) {
        *self.error_on_notifications.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_pull_request` fail for PR `number`
    pub fn fail_get_pr(&self, number: u64) {
        self.error_on_get_pr.lock().unwrap().insert(number);
    }

    /// Make `get_diff` fail for a PR
    pub fn fail_diff(&self, pr_url: &str) {
        self.error_on_diff.lock().unwrap().insert(pr_url.to_string());
    }

    /// Make `get_pr_comment` fail for a PR
    pub fn fail_comment(&self, pr_url: &str) {
        self.error_on_comment
            .lock()
            .unwrap()
            .insert(pr_url.to_string());
    }

    /// Make `is_branch_behind` return an error
    pub fn fail_is_behind(&self, msg: &str) {
        *self.error_on_is_behind.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `update_branch` return an error
    pub fn fail_update_branch(&self, msg: &str) {
        *self.error_on_update_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_approving_review` fail for PR `number`
    pub fn fail_approve(&self, number: u64) {
        self.error_on_approve.lock().unwrap().insert(number);
    }

    /// Make `enable_auto_merge` return an error
    pub fn fail_auto_merge(&self, msg: &str) {
        *self.error_on_auto_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `squash_merge` return an error
    pub fn fail_squash_merge(&self, msg: &str) {
        *self.error_on_squash_merge.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn get_pr_calls(&self) -> Vec<String> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    pub fn get_diff_calls(&self) -> Vec<String> {
        self.get_diff_calls.lock().unwrap().clone()
    }

    pub fn get_comment_calls(&self) -> Vec<String> {
        self.get_comment_calls.lock().unwrap().clone()
    }

    pub fn is_behind_calls(&self) -> Vec<(String, String)> {
        self.is_behind_calls.lock().unwrap().clone()
    }

    pub fn update_branch_calls(&self) -> Vec<PrCall> {
        self.update_branch_calls.lock().unwrap().clone()
    }

    pub fn approve_calls(&self) -> Vec<PrCall> {
        self.approve_calls.lock().unwrap().clone()
    }

    /// Numbers of PRs that received an approving review, sorted
    pub fn approved_numbers(&self) -> Vec<u64> {
        let mut numbers: Vec<u64> = self.approve_calls().iter().map(|c| c.number).collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn auto_merge_calls(&self) -> Vec<String> {
        self.auto_merge_calls.lock().unwrap().clone()
    }

    pub fn squash_merge_calls(&self) -> Vec<String> {
        self.squash_merge_calls.lock().unwrap().clone()
    }

    /// Whether any write endpoint was called
    pub fn has_writes(&self) -> bool {
        !self.update_branch_calls().is_empty()
            || !self.approve_calls().is_empty()
            || !self.auto_merge_calls().is_empty()
            || !self.squash_merge_calls().is_empty()
    }

    /// Highest number of fetches observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReviewPlatform for MockReviewPlatform {
    async fn list_review_notifications(&self) -> Result<Vec<Notification>> {
        if let Some(msg) = self.error_on_notifications.lock().unwrap().clone() {
            return Err(Error::Notifications(msg));
        }
        Ok(self.notifications.lock().unwrap().clone())
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<PullRequest>> {
        let key = pr_key(owner, repo, number);
        self.get_pr_calls.lock().unwrap().push(key.clone());
        self.enter().await;
        let result = if self.error_on_get_pr.lock().unwrap().contains(&number) {
            Err(Error::GitHubApi(format!("injected failure fetching {key}")))
        } else {
            Ok(self.pull_requests.lock().unwrap().get(&key).cloned())
        };
        self.leave();
        result
    }

    async fn get_diff(&self, pr: &PullRequest) -> Result<String> {
        self.get_diff_calls.lock().unwrap().push(pr.html_url.clone());
        self.enter().await;
        let result = if self.error_on_diff.lock().unwrap().contains(&pr.html_url) {
            Err(Error::GitHubApi("injected diff failure".to_string()))
        } else {
            Ok(self
                .diffs
                .lock()
                .unwrap()
                .get(&pr.html_url)
                .cloned()
                .unwrap_or_default())
        };
        self.leave();
        result
    }

    async fn get_pr_comment(&self, pr: &PullRequest) -> Result<String> {
        self.get_comment_calls
            .lock()
            .unwrap()
            .push(pr.html_url.clone());
        if self.error_on_comment.lock().unwrap().contains(&pr.html_url) {
            return Err(Error::GitHubApi("injected comment failure".to_string()));
        }
        self.comments
            .lock()
            .unwrap()
            .get(&pr.html_url)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("{} has no description", pr.html_url)))
    }

    async fn is_branch_behind(
        &self,
        owner: &str,
        repo: &str,
        base_ref: &str,
        head_ref: &str,
    ) -> Result<bool> {
        self.is_behind_calls
            .lock()
            .unwrap()
            .push((base_ref.to_string(), head_ref.to_string()));
        if let Some(msg) = self.error_on_is_behind.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        let prs = self.pull_requests.lock().unwrap();
        let behind = self.behind.lock().unwrap();
        Ok(prs.values().any(|pr| {
            pr.owner == owner
                && pr.repo == repo
                && pr.head_ref == head_ref
                && behind.contains(&pr.html_url)
        }))
    }

    async fn update_branch(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        self.update_branch_calls.lock().unwrap().push(PrCall {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        });
        if let Some(msg) = self.error_on_update_branch.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(())
    }

    async fn create_approving_review(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        self.approve_calls.lock().unwrap().push(PrCall {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        });
        if self.error_on_approve.lock().unwrap().contains(&number) {
            return Err(Error::GitHubApi(format!("injected approve failure for #{number}")));
        }
        Ok(())
    }

    async fn enable_auto_merge(&self, node_id: &str) -> Result<()> {
        self.auto_merge_calls
            .lock()
            .unwrap()
            .push(node_id.to_string());
        if let Some(msg) = self.error_on_auto_merge.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(())
    }

    async fn squash_merge(&self, pr: &PullRequest) -> Result<()> {
        self.squash_merge_calls
            .lock()
            .unwrap()
            .push(pr.html_url.clone());
        if let Some(msg) = self.error_on_squash_merge.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(())
    }
}
