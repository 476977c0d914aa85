//! Commit stage for a finished decision pass
//!
//! Two-phase pattern:
//! 1. Plan - decide which PRs to approve (`create_commit_plan`, pure)
//! 2. Execute - approve and merge them (`execute_commit`, effectful)

mod execute;
mod plan;

pub use execute::{CommitEntry, CommitOutcome, CommitReport, MergeRoute, execute_commit};
pub use plan::{CommitPlan, CommitStep, SkipReason, create_commit_plan, is_eligible};
