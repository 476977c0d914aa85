//! Fan-out collection of pending reviews
//!
//! Resolves review-request notifications into pull requests, fingerprints
//! their diffs, and merges everything into a [`ReviewIndex`]. Resolutions run
//! concurrently up to a fixed limit; merges are serialized by one lock and
//! deduplicated by PR URL, so the final index does not depend on completion
//! order.
//!
//! The batch fails as a unit: one failed resolution aborts the collection,
//! because an index missing some PRs would understate which fingerprints a
//! user has pending.

use crate::error::{Error, Result};
use crate::fingerprint::{ChangeLines, DiffFingerprints, Fingerprint, fingerprint_diff};
use crate::platform::ReviewPlatform;
use crate::types::{Notification, PullRequest};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use tracing::{debug, info};

/// Default number of notifications resolved at once
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Bipartite relation between fingerprints and pull requests
///
/// All lists are deduplicated and kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewIndex {
    /// user → fingerprint → PR URLs
    by_user: BTreeMap<String, HashMap<Fingerprint, Vec<String>>>,
    /// fingerprint → PR URLs (across all users)
    prs_by_fingerprint: HashMap<Fingerprint, Vec<String>>,
    /// PR URL → fingerprints
    fingerprints_by_pr: HashMap<String, Vec<Fingerprint>>,
    /// fingerprint → change lines (first writer wins)
    changes: HashMap<Fingerprint, ChangeLines>,
    /// PR URL → PR
    pull_requests: BTreeMap<String, PullRequest>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

impl ReviewIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one PR's fingerprints
    ///
    /// Idempotent: merging the same PR again changes nothing.
    pub fn merge(&mut self, pr: &PullRequest, extracted: DiffFingerprints) {
        let url = &pr.html_url;
        self.pull_requests
            .entry(url.clone())
            .or_insert_with(|| pr.clone());

        for fingerprint in &extracted.fingerprints {
            let user_prs = self
                .by_user
                .entry(pr.author.clone())
                .or_default()
                .entry(fingerprint.clone())
                .or_default();
            push_unique(user_prs, url.clone());

            push_unique(
                self.prs_by_fingerprint
                    .entry(fingerprint.clone())
                    .or_default(),
                url.clone(),
            );

            push_unique(
                self.fingerprints_by_pr.entry(url.clone()).or_default(),
                fingerprint.clone(),
            );
        }

        for (fingerprint, lines) in extracted.changes {
            self.changes.entry(fingerprint).or_insert(lines);
        }
    }

    /// Users with pending work, sorted
    pub fn users(&self) -> Vec<&str> {
        self.by_user.keys().map(String::as_str).collect()
    }

    /// Fingerprints awaiting one user, with the PR URLs for each
    pub fn user_fingerprints(&self, user: &str) -> Option<&HashMap<Fingerprint, Vec<String>>> {
        self.by_user.get(user).or_else(|| {
            self.by_user
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(user))
                .map(|(_, map)| map)
        })
    }

    /// Sorted, deduplicated fingerprints for the given users
    ///
    /// Exact user names win; otherwise the first case-insensitive match is used.
    pub fn fingerprints_for_users<S: AsRef<str>>(&self, users: &[S]) -> Vec<Fingerprint> {
        let mut result = BTreeSet::new();
        for user in users {
            if let Some(map) = self.user_fingerprints(user.as_ref().trim()) {
                result.extend(map.keys().cloned());
            }
        }
        result.into_iter().collect()
    }

    /// PRs containing a fingerprint, in insertion order
    pub fn prs_for(&self, fingerprint: &Fingerprint) -> Vec<&PullRequest> {
        self.prs_by_fingerprint
            .get(fingerprint)
            .map(|urls| {
                urls.iter()
                    .filter_map(|u| self.pull_requests.get(u))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// PRs of `user` containing a fingerprint, in insertion order
    ///
    /// Unlike [`ReviewIndex::prs_for`], PRs authored by other users are left out.
    pub fn user_prs_for(&self, user: &str, fingerprint: &Fingerprint) -> Vec<&PullRequest> {
        self.user_fingerprints(user)
            .and_then(|map| map.get(fingerprint))
            .map(|urls| {
                urls.iter()
                    .filter_map(|u| self.pull_requests.get(u))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// PR URLs containing a fingerprint
    pub fn pr_urls_for(&self, fingerprint: &Fingerprint) -> &[String] {
        self.prs_by_fingerprint
            .get(fingerprint)
            .map_or(&[], Vec::as_slice)
    }

    /// Fingerprints contained in a PR
    pub fn fingerprints_of(&self, pr_url: &str) -> &[Fingerprint] {
        self.fingerprints_by_pr
            .get(pr_url)
            .map_or(&[], Vec::as_slice)
    }

    /// Change lines of a fingerprint
    pub fn changes_for(&self, fingerprint: &Fingerprint) -> Option<&[String]> {
        self.changes.get(fingerprint).map(Vec::as_slice)
    }

    /// Look up a PR by URL
    pub fn pull_request(&self, pr_url: &str) -> Option<&PullRequest> {
        self.pull_requests.get(pr_url)
    }

    /// All PRs, sorted by URL
    pub fn pull_requests(&self) -> impl Iterator<Item = &PullRequest> {
        self.pull_requests.values()
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.prs_by_fingerprint.is_empty()
    }

    /// Number of distinct fingerprints
    pub fn fingerprint_count(&self) -> usize {
        self.prs_by_fingerprint.len()
    }
}

/// Resolve one notification to a fingerprinted open PR
///
/// `Ok(None)` for notifications that are not review requests and for PRs that
/// are gone or no longer open.
async fn resolve_notification(
    platform: &dyn ReviewPlatform,
    notification: &Notification,
) -> Result<Option<(PullRequest, DiffFingerprints)>> {
    if !notification.is_review_request() {
        return Ok(None);
    }

    let number = notification.pr_number().ok_or_else(|| {
        Error::resolution(
            notification.repo_label(),
            "parse subject URL",
            format!(
                "no PR number in {:?}",
                notification.subject_url.as_deref().unwrap_or_default()
            ),
        )
    })?;
    let subject = format!("{}#{number}", notification.repo_label());

    let Some(pr) = platform
        .get_pull_request(&notification.owner, &notification.repo, number)
        .await
        .map_err(|e| Error::resolution(&subject, "fetch pull request", e))?
    else {
        debug!(%subject, "PR not found, skipping");
        return Ok(None);
    };

    if !pr.is_open() {
        debug!(%subject, state = %pr.state, "PR not open, skipping");
        return Ok(None);
    }

    let diff = platform
        .get_diff(&pr)
        .await
        .map_err(|e| Error::resolution(&subject, "fetch diff", e))?;

    let extracted = fingerprint_diff(&diff);
    debug!(%subject, hunks = extracted.fingerprints.len(), "fingerprinted diff");
    Ok(Some((pr, extracted)))
}

/// Build the review index from the notification feed
pub async fn collect_review_index(
    platform: &dyn ReviewPlatform,
    concurrency: usize,
) -> Result<ReviewIndex> {
    let notifications = platform.list_review_notifications().await?;
    info!(count = notifications.len(), "collecting review requests");

    let index = Mutex::new(ReviewIndex::new());

    stream::iter(notifications.iter().map(Ok::<_, Error>))
        .try_for_each_concurrent(concurrency.max(1), |notification| {
            let index = &index;
            async move {
                let Some((pr, extracted)) = resolve_notification(platform, notification).await?
                else {
                    return Ok(());
                };
                index
                    .lock()
                    .map_err(|_| Error::Internal("review index lock poisoned".to_string()))?
                    .merge(&pr, extracted);
                Ok(())
            }
        })
        .await?;

    let index = index
        .into_inner()
        .map_err(|_| Error::Internal("review index lock poisoned".to_string()))?;

    info!(
        prs = index.pull_requests.len(),
        fingerprints = index.fingerprint_count(),
        "collected review index"
    );
    Ok(index)
}

/// Distinct PR URLs touched by a set of fingerprints, sorted
pub fn unique_prs_for<'a>(index: &'a ReviewIndex, fingerprints: &[Fingerprint]) -> Vec<&'a str> {
    let set: BTreeSet<&str> = fingerprints
        .iter()
        .flat_map(|f| index.pr_urls_for(f).iter().map(String::as_str))
        .collect();
    set.into_iter().collect()
}
