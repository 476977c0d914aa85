//! hunk-review - triage pending GitHub review requests one diff hunk at a time
//!
//! Dependency bots open the same change in many repositories and branches.
//! This crate fingerprints every hunk of every pull request awaiting review,
//! lets the operator decide once per distinct fingerprint, and approves the
//! pull requests whose fingerprints were all approved.
//!
//! Pipeline:
//!
//! 1. [`collect::collect_review_index`] resolves review-request notifications
//!    into PRs and builds the [`collect::ReviewIndex`].
//! 2. [`decision::DecisionEngine`] walks the fingerprints of the chosen users.
//! 3. [`commit::create_commit_plan`] picks the eligible PRs and
//!    [`commit::execute_commit`] approves and merges them.

pub mod auth;
pub mod collect;
pub mod commit;
pub mod config;
pub mod decision;
pub mod error;
pub mod fingerprint;
pub mod platform;
pub mod progress;
pub mod types;

pub use error::{Error, Result};
