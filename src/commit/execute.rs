//! Commit execution - effectful operations
//!
//! Takes a `CommitPlan` and approves each eligible PR through the platform.
//! A failing PR never stops the batch; its failure is recorded and the next
//! PR is processed.

use crate::commit::plan::{CommitPlan, CommitStep, SkipReason};
use crate::platform::ReviewPlatform;
use crate::progress::ProgressCallback;
use crate::types::PullRequest;
use tracing::{info, warn};

/// How an approved PR ends up merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRoute {
    /// Squash auto-merge enabled, GitHub merges once checks pass
    AutoMerge,
    /// Auto-merge unavailable, squash-merged directly
    SquashMerged,
}

/// Result for one PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Approved and queued or merged
    Approved(MergeRoute),
    /// Dry run: would have been approved
    WouldApprove,
    /// Not eligible
    NotAttempted(SkipReason),
    /// A required sub-step failed
    Failed {
        /// Sub-step that failed
        step: &'static str,
        /// Error text
        message: String,
    },
}

/// Report line for one PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    /// PR web URL
    pub pr_url: String,
    /// `owner/repo#n`
    pub label: String,
    /// What happened
    pub outcome: CommitOutcome,
    /// Best-effort sub-steps that failed without failing the PR
    pub warnings: Vec<String>,
}

/// Result of commit execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// One entry per plan step, in plan order
    pub entries: Vec<CommitEntry>,
}

impl CommitReport {
    /// Whether no PR failed
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Entries that were approved
    pub fn approved(&self) -> impl Iterator<Item = &CommitEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, CommitOutcome::Approved(_)))
    }

    /// Entries that failed
    pub fn failed(&self) -> impl Iterator<Item = &CommitEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, CommitOutcome::Failed { .. }))
    }

    /// Look up the entry for a PR
    pub fn entry(&self, pr_url: &str) -> Option<&CommitEntry> {
        self.entries.iter().find(|e| e.pr_url == pr_url)
    }
}

/// Bring the branch up to date when it is behind (best-effort)
async fn refresh_branch(
    pr: &PullRequest,
    platform: &dyn ReviewPlatform,
    progress: &dyn ProgressCallback,
    warnings: &mut Vec<String>,
) {
    if pr.base_ref.is_empty() || pr.head_ref.is_empty() {
        return;
    }

    match platform
        .is_branch_behind(&pr.owner, &pr.repo, &pr.base_ref, &pr.head_ref)
        .await
    {
        Ok(true) => {
            progress
                .on_message(&format!("🔄 Updating {} from {}", pr.head_ref, pr.base_ref))
                .await;
            if let Err(e) = platform.update_branch(&pr.owner, &pr.repo, pr.number).await {
                let message = format!("failed to update branch of {}: {e}", pr.html_url);
                warn!(pr = %pr.html_url, error = %e, "branch update failed");
                progress.on_warning(&message).await;
                warnings.push(message);
            }
        }
        Ok(false) => {}
        Err(e) => {
            let message = format!("failed to compare branches of {}: {e}", pr.html_url);
            warn!(pr = %pr.html_url, error = %e, "branch comparison failed");
            progress.on_warning(&message).await;
            warnings.push(message);
        }
    }
}

/// Enable auto-merge, falling back to an immediate squash merge
async fn merge_approved(
    pr: &PullRequest,
    platform: &dyn ReviewPlatform,
    progress: &dyn ProgressCallback,
    warnings: &mut Vec<String>,
) -> CommitOutcome {
    let auto_merge_error = match pr.node_id.as_deref() {
        Some(node_id) => match platform.enable_auto_merge(node_id).await {
            Ok(()) => return CommitOutcome::Approved(MergeRoute::AutoMerge),
            Err(e) => e.to_string(),
        },
        None => "PR has no node id".to_string(),
    };

    let message = format!(
        "auto-merge unavailable for {} ({auto_merge_error}), squash merging",
        pr.html_url
    );
    warn!(pr = %pr.html_url, error = %auto_merge_error, "auto-merge failed");
    progress.on_warning(&message).await;
    warnings.push(message);

    match platform.squash_merge(pr).await {
        Ok(()) => CommitOutcome::Approved(MergeRoute::SquashMerged),
        Err(e) => CommitOutcome::Failed {
            step: "merge",
            message: format!(
                "enable auto-merge failed: {auto_merge_error}; squash merge failed: {e}"
            ),
        },
    }
}

async fn approve_pr(
    pr: &PullRequest,
    platform: &dyn ReviewPlatform,
    progress: &dyn ProgressCallback,
    warnings: &mut Vec<String>,
) -> CommitOutcome {
    refresh_branch(pr, platform, progress, warnings).await;

    if let Err(e) = platform
        .create_approving_review(&pr.owner, &pr.repo, pr.number)
        .await
    {
        return CommitOutcome::Failed {
            step: "create approving review",
            message: e.to_string(),
        };
    }

    merge_approved(pr, platform, progress, warnings).await
}

/// Execute the commit plan (EFFECTFUL)
///
/// With `dry_run` no platform call is made and eligible PRs are recorded as
/// [`CommitOutcome::WouldApprove`].
pub async fn execute_commit(
    plan: &CommitPlan,
    platform: &dyn ReviewPlatform,
    progress: &dyn ProgressCallback,
    dry_run: bool,
) -> CommitReport {
    let mut report = CommitReport::default();

    for step in &plan.steps {
        let pr = step.pr();
        let mut warnings = Vec::new();

        let outcome = match step {
            CommitStep::Skip { reason, .. } => {
                progress
                    .on_message(&format!("⏭️  Not approving {} ({reason})", pr.html_url))
                    .await;
                CommitOutcome::NotAttempted(reason.clone())
            }
            CommitStep::Approve { .. } if dry_run => {
                progress
                    .on_message(&format!("[dry-run] Would approve {}", pr.html_url))
                    .await;
                CommitOutcome::WouldApprove
            }
            CommitStep::Approve { .. } => {
                progress
                    .on_message(&format!("✅ Approving {}: {}", pr.label(), pr.title))
                    .await;
                let outcome = approve_pr(pr, platform, progress, &mut warnings).await;
                match &outcome {
                    CommitOutcome::Approved(route) => {
                        info!(pr = %pr.html_url, ?route, "approved");
                    }
                    CommitOutcome::Failed { step, message } => {
                        warn!(pr = %pr.html_url, step, %message, "approval failed");
                    }
                    _ => {}
                }
                outcome
            }
        };

        report.entries.push(CommitEntry {
            pr_url: pr.html_url.clone(),
            label: pr.label(),
            outcome,
            warnings,
        });
    }

    report
}
