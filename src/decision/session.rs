//! Per-pass decision state

use crate::fingerprint::Fingerprint;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Decisions taken during one pass
///
/// A fingerprint is never both approved and declined.
#[derive(Debug, Clone, Default)]
pub struct ApprovalSession {
    approved: HashSet<Fingerprint>,
    declined: HashSet<Fingerprint>,
    skipped_prs: HashSet<String>,
    /// change line → fingerprint it was first shown under
    first_seen: HashMap<String, Fingerprint>,
}

impl ApprovalSession {
    /// Fresh session with nothing decided
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark approved; returns false if it is declined, which is final
    pub fn approve(&mut self, fingerprint: &Fingerprint) -> bool {
        if self.declined.contains(fingerprint) {
            return false;
        }
        self.approved.insert(fingerprint.clone());
        true
    }

    /// Mark declined, removing any approval
    pub fn decline(&mut self, fingerprint: &Fingerprint) {
        self.approved.remove(fingerprint);
        self.declined.insert(fingerprint.clone());
    }

    /// Mark a PR as skipped; returns false if it already was
    pub fn skip_pr(&mut self, pr_url: &str) -> bool {
        self.skipped_prs.insert(pr_url.to_string())
    }

    /// Whether approved
    pub fn is_approved(&self, fingerprint: &Fingerprint) -> bool {
        self.approved.contains(fingerprint)
    }

    /// Whether declined
    pub fn is_declined(&self, fingerprint: &Fingerprint) -> bool {
        self.declined.contains(fingerprint)
    }

    /// Approved or declined
    pub fn is_decided(&self, fingerprint: &Fingerprint) -> bool {
        self.is_approved(fingerprint) || self.is_declined(fingerprint)
    }

    /// Whether a PR was skipped by a decline
    pub fn is_skipped(&self, pr_url: &str) -> bool {
        self.skipped_prs.contains(pr_url)
    }

    /// Approved fingerprints
    pub fn approved(&self) -> &HashSet<Fingerprint> {
        &self.approved
    }

    /// Declined fingerprints
    pub fn declined(&self) -> &HashSet<Fingerprint> {
        &self.declined
    }

    /// URLs of skipped PRs
    pub fn skipped_prs(&self) -> &HashSet<String> {
        &self.skipped_prs
    }

    /// Fingerprint a change line was first shown under
    pub fn first_seen(&self, line: &str) -> Option<&Fingerprint> {
        self.first_seen.get(line)
    }

    /// Record `line` as first seen under `fingerprint` unless already recorded
    pub(crate) fn record_seen(&mut self, line: &str, fingerprint: &Fingerprint) {
        self.first_seen
            .entry(line.to_string())
            .or_insert_with(|| fingerprint.clone());
    }

    /// Originators if every line duplicates an approved fingerprint seen earlier
    ///
    /// `None` when any line is unseen, was first seen under `fingerprint`
    /// itself, or points at an originator that is not approved.
    pub(crate) fn collapse_origins<S: AsRef<str>>(
        &self,
        fingerprint: &Fingerprint,
        lines: &[S],
    ) -> Option<Vec<Fingerprint>> {
        if lines.is_empty() {
            return None;
        }
        let mut origins = BTreeSet::new();
        for line in lines {
            let origin = self.first_seen.get(line.as_ref())?;
            if origin == fingerprint || !self.approved.contains(origin) {
                return None;
            }
            origins.insert(origin.clone());
        }
        Some(origins.into_iter().collect())
    }
}
