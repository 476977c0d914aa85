//! Decision engine
//!
//! Walks the fingerprints awaiting a user and records the operator's verdict
//! on each one. Rules applied while walking:
//!
//! - a fingerprint whose every change line was already shown under approved
//!   fingerprints is approved without asking (duplicate collapse);
//! - approving may approve the other fingerprints of the same PRs
//!   ([`DecisionOptions::propagate`]);
//! - declining always skips the PRs containing the fingerprint and declines
//!   their other fingerprints.
//!
//! The pass is driven by an [`InputSource`] and reports what it does through a
//! [`DecisionObserver`], so the same engine serves the terminal and tests.

mod engine;
mod input;
mod session;

pub use engine::{
    DecisionEngine, DecisionEvent, DecisionObserver, DecisionOptions, DecisionPass, NoopObserver,
    PrComment, PresentedLine, WalkProgress,
};
pub use input::{Action, InputSource, LineInput, ScriptedInput, TerminalInput, parse_action};
pub use session::ApprovalSession;
