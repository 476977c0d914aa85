//! Commit planning - pure functions for deciding which PRs get approved
//!
//! No I/O happens here: the index and the finished session are passed in, so
//! eligibility rules are easy to unit test.

use crate::collect::ReviewIndex;
use crate::decision::ApprovalSession;
use crate::fingerprint::Fingerprint;
use crate::types::PullRequest;

/// Why a PR is left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// At least one of its fingerprints was declined
    DeclinedFingerprint,
    /// Every one of its fingerprints was declined
    AllDeclined,
    /// Some fingerprints were never approved (sorted)
    Unapproved(Vec<Fingerprint>),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeclinedFingerprint => write!(f, "contains a declined hunk"),
            Self::AllDeclined => write!(f, "all hunks declined"),
            Self::Unapproved(fingerprints) => {
                let short: Vec<&str> = fingerprints.iter().map(Fingerprint::short).collect();
                write!(f, "{} hunk(s) not approved: {}", short.len(), short.join(", "))
            }
        }
    }
}

/// A single step in the commit plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStep {
    /// Approve (and merge) this PR
    Approve {
        /// Target PR
        pr: PullRequest,
    },
    /// Leave this PR alone
    Skip {
        /// Affected PR
        pr: PullRequest,
        /// Why
        reason: SkipReason,
    },
}

impl CommitStep {
    /// PR this step is about
    pub const fn pr(&self) -> &PullRequest {
        match self {
            Self::Approve { pr } | Self::Skip { pr, .. } => pr,
        }
    }
}

impl std::fmt::Display for CommitStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve { pr } => write!(f, "approve {}: {}", pr.label(), pr.title),
            Self::Skip { pr, reason } => write!(f, "skip {} ({reason})", pr.label()),
        }
    }
}

/// Commit plan - ordered by PR URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPlan {
    /// Steps to perform (or record as skipped)
    pub steps: Vec<CommitStep>,
}

impl CommitPlan {
    /// Whether nothing will be approved
    pub fn is_empty(&self) -> bool {
        self.approve_count() == 0
    }

    /// Number of PRs to approve
    pub fn approve_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, CommitStep::Approve { .. }))
            .count()
    }

    /// Number of PRs left alone
    pub fn skip_count(&self) -> usize {
        self.steps.len() - self.approve_count()
    }
}

/// Whether a PR with `fingerprints` may be approved
///
/// Requires the PR not to be skipped, at least one approval in the session, and
/// every fingerprint of the PR approved. An undecided fingerprint blocks.
pub fn is_eligible(fingerprints: &[Fingerprint], pr_url: &str, session: &ApprovalSession) -> bool {
    !session.is_skipped(pr_url)
        && !fingerprints.is_empty()
        && !session.approved().is_empty()
        && !fingerprints.iter().all(|f| session.is_declined(f))
        && fingerprints.iter().all(|f| session.is_approved(f))
}

fn skip_reason(
    fingerprints: &[Fingerprint],
    pr_url: &str,
    session: &ApprovalSession,
) -> SkipReason {
    if fingerprints.iter().all(|f| session.is_declined(f)) {
        return SkipReason::AllDeclined;
    }
    if session.is_skipped(pr_url) || fingerprints.iter().any(|f| session.is_declined(f)) {
        return SkipReason::DeclinedFingerprint;
    }
    let mut unapproved: Vec<Fingerprint> = fingerprints
        .iter()
        .filter(|f| !session.is_approved(f))
        .cloned()
        .collect();
    unapproved.sort();
    unapproved.dedup();
    SkipReason::Unapproved(unapproved)
}

/// Create a commit plan (PURE - no I/O, easily testable)
///
/// PRs without fingerprints, and PRs none of whose fingerprints were decided
/// in this pass, are left out of the plan.
pub fn create_commit_plan(index: &ReviewIndex, session: &ApprovalSession) -> CommitPlan {
    let mut steps = Vec::new();

    for pr in index.pull_requests() {
        let fingerprints = index.fingerprints_of(&pr.html_url);
        if fingerprints.is_empty() {
            continue;
        }
        let touched = session.is_skipped(&pr.html_url)
            || fingerprints.iter().any(|f| session.is_decided(f));
        if !touched {
            continue;
        }

        if is_eligible(fingerprints, &pr.html_url, session) {
            steps.push(CommitStep::Approve { pr: pr.clone() });
        } else {
            steps.push(CommitStep::Skip {
                pr: pr.clone(),
                reason: skip_reason(fingerprints, &pr.html_url, session),
            });
        }
    }

    CommitPlan { steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint_diff;
    use crate::types::PrState;

    fn pr(number: u64) -> PullRequest {
        PullRequest {
            number,
            html_url: format!("https://github.com/octo/widgets/pull/{number}"),
            owner: "octo".to_string(),
            repo: "widgets".to_string(),
            title: format!("Bump dep {number}"),
            body: None,
            node_id: None,
            base_ref: "main".to_string(),
            head_ref: format!("dep-{number}"),
            author: "dependabot[bot]".to_string(),
            state: PrState::Open,
        }
    }

    fn fp(line: &str) -> Fingerprint {
        Fingerprint::of_lines(&[line])
    }

    fn index() -> ReviewIndex {
        let mut index = ReviewIndex::new();
        index.merge(&pr(1), fingerprint_diff("@@ @@\n+a\n@@ @@\n+b\n"));
        index.merge(&pr(2), fingerprint_diff("@@ @@\n+c\n"));
        index
    }

    #[test]
    fn test_both_fingerprints_needed() {
        let fps = [fp("+a"), fp("+b")];
        let url = &pr(1).html_url;
        let mut session = ApprovalSession::new();

        session.approve(&fps[0]);
        assert!(!is_eligible(&fps, url, &session));

        session.approve(&fps[1]);
        assert!(is_eligible(&fps, url, &session));

        session.skip_pr(url);
        assert!(!is_eligible(&fps, url, &session));
    }

    #[test]
    fn test_undecided_pr_is_left_out() {
        let mut session = ApprovalSession::new();
        session.approve(&fp("+c"));
        let plan = create_commit_plan(&index(), &session);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0], CommitStep::Approve { pr: pr(2) });
    }

    #[test]
    fn test_partial_approval_is_skipped_with_unapproved_list() {
        let mut session = ApprovalSession::new();
        session.approve(&fp("+a"));
        let plan = create_commit_plan(&index(), &session);
        assert_eq!(
            plan.steps,
            vec![CommitStep::Skip {
                pr: pr(1),
                reason: SkipReason::Unapproved(vec![fp("+b")]),
            }]
        );
        assert!(plan.is_empty());
        assert_eq!(plan.skip_count(), 1);
    }

    #[test]
    fn test_declined_reasons() {
        let mut session = ApprovalSession::new();
        session.decline(&fp("+a"));
        session.decline(&fp("+c"));
        session.approve(&fp("+b"));
        let plan = create_commit_plan(&index(), &session);
        assert_eq!(plan.steps.len(), 2);
        assert!(matches!(
            &plan.steps[0],
            CommitStep::Skip { reason: SkipReason::DeclinedFingerprint, .. }
        ));
        assert!(matches!(
            &plan.steps[1],
            CommitStep::Skip { reason: SkipReason::AllDeclined, .. }
        ));
    }

    #[test]
    fn test_plan_is_sorted_by_url() {
        let mut session = ApprovalSession::new();
        for f in [fp("+a"), fp("+b"), fp("+c")] {
            session.approve(&f);
        }
        let plan = create_commit_plan(&index(), &session);
        let urls: Vec<&str> = plan.steps.iter().map(|s| s.pr().html_url.as_str()).collect();
        let mut sorted = urls.clone();
        sorted.sort_unstable();
        assert_eq!(urls, sorted);
        assert_eq!(plan.approve_count(), 2);
    }
}
