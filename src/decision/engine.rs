//! Interactive walk over pending fingerprints

use super::input::{Action, InputSource, parse_action};
use super::session::ApprovalSession;
use crate::collect::{ReviewIndex, unique_prs_for};
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::platform::ReviewPlatform;
use crate::types::PullRequest;
use tracing::{debug, info};

/// Knobs for one decision pass
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionOptions {
    /// Approving a fingerprint also approves the undecided fingerprints of its PRs
    pub propagate: bool,
}

/// A change line as shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedLine {
    /// The `+`/`-` line
    pub text: String,
    /// Fingerprint the line was first shown under, when it repeats
    pub duplicate_of: Option<Fingerprint>,
}

/// Description of one PR, or why it could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrComment {
    /// PR the description belongs to
    pub pr_url: String,
    /// Cleaned description, or the error text
    pub body: std::result::Result<String, String>,
}

/// Position of a fingerprint in the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkProgress {
    /// 1-based index of the fingerprint
    pub fingerprint: usize,
    /// Number of fingerprints in the walk
    pub fingerprint_total: usize,
    /// 1-based position of the fingerprint's first PR among all PRs of the walk
    pub pr: usize,
    /// Number of distinct PRs in the walk
    pub pr_total: usize,
}

/// Things that happen during a pass, for the UI to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionEvent {
    /// Not prompted because one of its PRs was skipped
    SkippedForPr {
        /// Skipped fingerprint
        fingerprint: Fingerprint,
        /// The skipped PR that caused it
        pr_url: String,
    },
    /// Approved without a prompt: every line repeats an approved fingerprint
    Collapsed {
        /// Approved fingerprint
        fingerprint: Fingerprint,
        /// Approved fingerprints its lines were first seen under, sorted
        origins: Vec<Fingerprint>,
    },
    /// Shown to the operator; a prompt follows
    Presented {
        /// Fingerprint awaiting a decision
        fingerprint: Fingerprint,
        /// Its change lines
        lines: Vec<PresentedLine>,
        /// PRs containing it
        prs: Vec<PullRequest>,
        /// Where the walk stands
        progress: WalkProgress,
    },
    /// Approved because a fingerprint sharing a PR was approved
    AutoApproved {
        /// Newly approved fingerprint
        fingerprint: Fingerprint,
        /// Operator-approved fingerprint
        via: Fingerprint,
        /// Shared PR
        pr_url: String,
    },
    /// Declined because a fingerprint sharing a PR was declined
    AutoDeclined {
        /// Newly declined fingerprint
        fingerprint: Fingerprint,
        /// Operator-declined fingerprint
        via: Fingerprint,
        /// Shared PR
        pr_url: String,
    },
    /// PR will not be approved in this pass
    PrSkipped {
        /// Skipped PR
        pr_url: String,
        /// Declined fingerprint that caused it
        fingerprint: Fingerprint,
    },
    /// Descriptions fetched for the `s` action
    Comments {
        /// Fingerprint being looked at
        fingerprint: Fingerprint,
        /// One entry per PR containing it
        comments: Vec<PrComment>,
    },
    /// Unrecognized answer; the prompt repeats
    InvalidInput {
        /// What was typed
        input: String,
    },
}

/// Receives [`DecisionEvent`]s as the pass runs
pub trait DecisionObserver {
    /// Called once per event, in order
    fn on_event(&self, event: &DecisionEvent);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {
    fn on_event(&self, _event: &DecisionEvent) {}
}

/// How a pass ended
#[derive(Debug, Clone)]
pub enum DecisionPass {
    /// Every fingerprint was visited
    Completed(ApprovalSession),
    /// The operator quit; nothing is to be committed
    Quit,
}

/// Decision state machine over one [`ReviewIndex`]
pub struct DecisionEngine<'a> {
    index: &'a ReviewIndex,
    options: DecisionOptions,
    session: ApprovalSession,
}

impl<'a> DecisionEngine<'a> {
    /// New engine with an empty session
    pub fn new(index: &'a ReviewIndex, options: DecisionOptions) -> Self {
        Self {
            index,
            options,
            session: ApprovalSession::new(),
        }
    }

    /// Decisions so far
    pub const fn session(&self) -> &ApprovalSession {
        &self.session
    }

    /// Finish and hand out the session
    pub fn into_session(self) -> ApprovalSession {
        self.session
    }

    /// Approve `fingerprint`, propagating to PR siblings when enabled
    ///
    /// A declined fingerprint stays declined and nothing changes. Propagation
    /// never overrides a decision already taken.
    pub fn approve(&mut self, fingerprint: &Fingerprint, observer: &dyn DecisionObserver) {
        let index = self.index;
        if !self.session.approve(fingerprint) {
            debug!(%fingerprint, "already declined, not approving");
            return;
        }
        if !self.options.propagate {
            return;
        }
        for pr_url in index.pr_urls_for(fingerprint) {
            for sibling in index.fingerprints_of(pr_url) {
                if sibling == fingerprint || self.session.is_decided(sibling) {
                    continue;
                }
                self.session.approve(sibling);
                observer.on_event(&DecisionEvent::AutoApproved {
                    fingerprint: sibling.clone(),
                    via: fingerprint.clone(),
                    pr_url: pr_url.clone(),
                });
            }
        }
    }

    /// Decline `fingerprint`, skip every PR containing it and decline their other fingerprints
    ///
    /// Overrides earlier approvals of those siblings.
    pub fn decline(&mut self, fingerprint: &Fingerprint, observer: &dyn DecisionObserver) {
        let index = self.index;
        self.session.decline(fingerprint);
        for pr_url in index.pr_urls_for(fingerprint) {
            if self.session.skip_pr(pr_url) {
                observer.on_event(&DecisionEvent::PrSkipped {
                    pr_url: pr_url.clone(),
                    fingerprint: fingerprint.clone(),
                });
            }
            for sibling in index.fingerprints_of(pr_url) {
                if sibling == fingerprint || self.session.is_declined(sibling) {
                    continue;
                }
                self.session.decline(sibling);
                observer.on_event(&DecisionEvent::AutoDeclined {
                    fingerprint: sibling.clone(),
                    via: fingerprint.clone(),
                    pr_url: pr_url.clone(),
                });
            }
        }
    }

    fn skipped_pr_of(&self, fingerprint: &Fingerprint) -> Option<&'a String> {
        self.index
            .pr_urls_for(fingerprint)
            .iter()
            .find(|url| self.session.is_skipped(url))
    }

    /// Show lines, recording first sightings
    fn present_lines(&mut self, fingerprint: &Fingerprint) -> Vec<PresentedLine> {
        let index = self.index;
        let Some(lines) = index.changes_for(fingerprint) else {
            return Vec::new();
        };
        lines
            .iter()
            .map(|line| {
                let duplicate_of = self.session.first_seen(line).cloned();
                if duplicate_of.is_none() {
                    self.session.record_seen(line, fingerprint);
                }
                PresentedLine {
                    text: line.clone(),
                    duplicate_of,
                }
            })
            .collect()
    }

    async fn fetch_comments(
        &self,
        fingerprint: &Fingerprint,
        platform: &dyn ReviewPlatform,
    ) -> Vec<PrComment> {
        let mut comments = Vec::new();
        for pr in self.index.prs_for(fingerprint) {
            let body = platform
                .get_pr_comment(pr)
                .await
                .map_err(|e| e.to_string());
            comments.push(PrComment {
                pr_url: pr.html_url.clone(),
                body,
            });
        }
        comments
    }

    /// Walk `fingerprints` in sorted order, prompting for each undecided one
    ///
    /// End of input counts as quitting.
    #[allow(clippy::future_not_send)]
    pub async fn run(
        mut self,
        fingerprints: &[Fingerprint],
        input: &mut dyn InputSource,
        platform: &dyn ReviewPlatform,
        observer: &dyn DecisionObserver,
    ) -> Result<DecisionPass> {
        let index = self.index;
        let mut walk = fingerprints.to_vec();
        walk.sort();
        walk.dedup();

        let all_prs = unique_prs_for(index, &walk);
        let total = walk.len();
        info!(fingerprints = total, prs = all_prs.len(), "starting decision pass");

        for (idx, fingerprint) in walk.iter().enumerate() {
            if self.session.is_decided(fingerprint) {
                continue;
            }

            if let Some(pr_url) = self.skipped_pr_of(fingerprint) {
                observer.on_event(&DecisionEvent::SkippedForPr {
                    fingerprint: fingerprint.clone(),
                    pr_url: pr_url.clone(),
                });
                continue;
            }

            if let Some(lines) = index.changes_for(fingerprint)
                && let Some(origins) = self.session.collapse_origins(fingerprint, lines)
            {
                self.session.approve(fingerprint);
                debug!(%fingerprint, "collapsed into approved duplicates");
                observer.on_event(&DecisionEvent::Collapsed {
                    fingerprint: fingerprint.clone(),
                    origins,
                });
                continue;
            }

            let lines = self.present_lines(fingerprint);
            let prs: Vec<PullRequest> = index
                .prs_for(fingerprint)
                .into_iter()
                .cloned()
                .collect();
            let pr_position = prs
                .first()
                .and_then(|first| all_prs.iter().position(|u| *u == first.html_url))
                .map_or(1, |p| p + 1);
            let progress = WalkProgress {
                fingerprint: idx + 1,
                fingerprint_total: total,
                pr: pr_position,
                pr_total: all_prs.len(),
            };
            observer.on_event(&DecisionEvent::Presented {
                fingerprint: fingerprint.clone(),
                lines,
                prs,
                progress,
            });

            let prompt = format!(
                "pr {}/{} hunk {}/{}: approve? (y/n/s/q)",
                progress.pr, progress.pr_total, progress.fingerprint, progress.fingerprint_total
            );

            loop {
                let Some(answer) = input.next_line(&prompt)? else {
                    info!("input ended, quitting decision pass");
                    return Ok(DecisionPass::Quit);
                };
                match parse_action(&answer) {
                    Some(Action::Approve) => {
                        debug!(%fingerprint, "approved");
                        self.approve(fingerprint, observer);
                        break;
                    }
                    Some(Action::Decline) => {
                        debug!(%fingerprint, "declined");
                        self.decline(fingerprint, observer);
                        break;
                    }
                    Some(Action::ShowComment) => {
                        let comments = self.fetch_comments(fingerprint, platform).await;
                        observer.on_event(&DecisionEvent::Comments {
                            fingerprint: fingerprint.clone(),
                            comments,
                        });
                    }
                    Some(Action::Quit) => {
                        info!("operator quit decision pass");
                        return Ok(DecisionPass::Quit);
                    }
                    None => observer.on_event(&DecisionEvent::InvalidInput {
                        input: answer.trim().to_string(),
                    }),
                }
            }
        }

        info!(
            approved = self.session.approved().len(),
            declined = self.session.declined().len(),
            skipped_prs = self.session.skipped_prs().len(),
            "decision pass complete"
        );
        Ok(DecisionPass::Completed(self.session))
    }
}
