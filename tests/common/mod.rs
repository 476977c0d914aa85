//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{MockReviewPlatform, PrCall};

use chrono::Utc;
use hunk_review::decision::{DecisionEvent, DecisionObserver};
use hunk_review::fingerprint::Fingerprint;
use hunk_review::types::{Notification, PrState, PullRequest};
use std::sync::Mutex;

/// Open PR in `octo/<repo>` authored by `author`
pub fn make_pr(repo: &str, number: u64, author: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/octo/{repo}/pull/{number}"),
        owner: "octo".to_string(),
        repo: repo.to_string(),
        title: format!("Bump serde in {repo} (#{number})"),
        body: Some("Bumps serde.".to_string()),
        node_id: Some(format!("PR_kw{repo}{number}")),
        base_ref: "main".to_string(),
        head_ref: format!("dependabot/cargo/serde-{number}"),
        author: author.to_string(),
        state: PrState::Open,
    }
}

/// Review-request notification pointing at `pr`
pub fn make_notification(pr: &PullRequest) -> Notification {
    Notification {
        id: format!("thread-{}-{}", pr.repo, pr.number),
        reason: "review_requested".to_string(),
        owner: pr.owner.clone(),
        repo: pr.repo.clone(),
        subject_title: pr.title.clone(),
        subject_type: "PullRequest".to_string(),
        subject_url: Some(format!(
            "https://api.github.com/repos/{}/{}/pulls/{}",
            pr.owner, pr.repo, pr.number
        )),
        updated_at: Utc::now(),
    }
}

/// Unified diff with one hunk per entry; each entry is a list of change lines
pub fn make_diff(hunks: &[&[&str]]) -> String {
    let mut diff = String::from(
        "diff --git a/Cargo.toml b/Cargo.toml\nindex 1111111..2222222 100644\n--- a/Cargo.toml\n+++ b/Cargo.toml\n",
    );
    for (i, hunk) in hunks.iter().enumerate() {
        let start = i * 20 + 1;
        diff.push_str(&format!("@@ -{start},3 +{start},3 @@\n context\n"));
        for line in *hunk {
            diff.push_str(line);
            diff.push('\n');
        }
        diff.push_str(" trailing context\n");
    }
    diff
}

/// Fingerprint of a hunk with these change lines
pub fn fp(lines: &[&str]) -> Fingerprint {
    Fingerprint::of_lines(lines)
}

/// Observer that keeps every event
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DecisionEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Fingerprints that were presented, in order
    pub fn presented(&self) -> Vec<Fingerprint> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DecisionEvent::Presented { fingerprint, .. } => Some(fingerprint),
                _ => None,
            })
            .collect()
    }

    /// Fingerprints that collapsed into approved duplicates
    pub fn collapsed(&self) -> Vec<Fingerprint> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DecisionEvent::Collapsed { fingerprint, .. } => Some(fingerprint),
                _ => None,
            })
            .collect()
    }
}

impl DecisionObserver for RecordingObserver {
    fn on_event(&self, event: &DecisionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
