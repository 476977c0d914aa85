//! Manual command - interactive hunk-by-hunk review, then approve eligible PRs

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::show::{parse_user_filter, print_pr_line};
use crate::cli::style::{Stylize, check, diff_line};
use anstream::println;
use dialoguer::{Confirm, Select};
use hunk_review::collect::ReviewIndex;
use hunk_review::commit::{
    CommitOutcome, CommitPlan, CommitReport, CommitStep, MergeRoute, create_commit_plan,
    execute_commit,
};
use hunk_review::decision::{
    DecisionEngine, DecisionEvent, DecisionObserver, DecisionOptions, DecisionPass, TerminalInput,
};
use hunk_review::error::{Error, Result};
use tracing::debug;

/// Options for the manual command
#[derive(Debug, Clone, Default)]
pub struct ManualOptions {
    /// Users to review (comma-separated values allowed)
    pub users: Vec<String>,
    /// Approving a hunk approves the rest of its PRs
    pub propagate: bool,
    /// Show what would be approved without approving
    pub dry_run: bool,
    /// Preview the plan and prompt before approving
    pub confirm: bool,
    /// Echo warnings to stderr too
    pub verbose: bool,
}

/// Prints decision events as they happen
struct TerminalObserver;

impl DecisionObserver for TerminalObserver {
    fn on_event(&self, event: &DecisionEvent) {
        match event {
            DecisionEvent::SkippedForPr {
                fingerprint,
                pr_url,
            } => println!(
                "{}",
                format!("Skipping hunk {fingerprint}: PR {pr_url} was already skipped").muted()
            ),
            DecisionEvent::Collapsed {
                fingerprint,
                origins,
            } => {
                let origins: Vec<&str> = origins.iter().map(|o| o.short()).collect();
                println!(
                    "{} {}",
                    check(),
                    format!(
                        "All changes of hunk {fingerprint} repeat approved hunk(s) [{}], auto-approving",
                        origins.join(", ")
                    )
                    .muted()
                );
            }
            DecisionEvent::Presented {
                fingerprint,
                lines,
                prs,
                ..
            } => {
                println!();
                println!("{} {}", "Hunk".emphasis(), fingerprint.as_str().accent());
                if lines.is_empty() {
                    println!("  {}", "No changes recorded for this hunk.".muted());
                }
                for line in lines {
                    match &line.duplicate_of {
                        Some(origin) => println!(
                            "  {} {}",
                            format!("[duplicate of {}]", origin.short()).success(),
                            line.text.success()
                        ),
                        None => println!("  {}", diff_line(&line.text)),
                    }
                }
                println!("{}", "Associated PRs:".emphasis());
                if prs.is_empty() {
                    println!("  {}", "No PRs associated with this hunk.".muted());
                }
                for pr in prs {
                    print_pr_line(pr, "  ");
                }
            }
            DecisionEvent::AutoApproved {
                fingerprint,
                pr_url,
                ..
            } => println!(
                "{}",
                format!("Auto-approved linked hunk {} (from PR {pr_url})", fingerprint.short())
                    .warn()
            ),
            DecisionEvent::AutoDeclined {
                fingerprint,
                pr_url,
                ..
            } => println!(
                "{}",
                format!("Declined linked hunk {} (from PR {pr_url})", fingerprint.short()).warn()
            ),
            DecisionEvent::PrSkipped {
                pr_url,
                fingerprint,
            } => println!(
                "{}",
                format!("Skipping PR {pr_url} because hunk {} was declined", fingerprint.short())
                    .warn()
            ),
            DecisionEvent::Comments { comments, .. } => {
                if comments.is_empty() {
                    println!("{}", "No PR description found for this hunk.".warn());
                }
                for comment in comments {
                    let heading = format!("--- From PR {} ---", comment.pr_url);
                    let rule = "-".repeat(heading.chars().count());
                    println!();
                    println!("{}", rule.accent());
                    println!("{}", heading.accent());
                    println!("{}", rule.accent());
                    match &comment.body {
                        Ok(body) => println!("{body}"),
                        Err(e) => {
                            println!("{}", format!("Could not fetch description: {e}").error());
                        }
                    }
                }
                println!();
            }
            DecisionEvent::InvalidInput { .. } => println!(
                "{}",
                "Please enter y (approve), n (decline), s (show description) or q (quit)".warn()
            ),
        }
    }
}

/// Ask which user to review when none was given
fn pick_user(index: &ReviewIndex) -> Result<Option<String>> {
    let users = index.users();
    match users.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some((*only).to_string())),
        _ => {
            let choice = Select::new()
                .with_prompt("Review hunks for which user?")
                .items(&users)
                .default(0)
                .interact_opt()
                .map_err(|e| Error::Input(format!("Failed to read selection: {e}")))?;
            Ok(choice.map(|i| users[i].to_string()))
        }
    }
}

/// Run the manual command
#[allow(clippy::future_not_send)]
pub async fn run_manual(global: &GlobalOptions, options: ManualOptions) -> Result<()> {
    // =========================================================================
    // Phase 1: COLLECT
    // =========================================================================

    let ctx = CommandContext::new(global).await?;
    let propagate = options.propagate || ctx.config.propagate;
    let dry_run = options.dry_run || ctx.config.dry_run;
    debug!(config = %ctx.config_path.display(), propagate, dry_run, "manual review");

    let index = ctx.collect().await?;

    let mut users = parse_user_filter(&options.users);
    if users.is_empty() {
        match pick_user(&index)? {
            Some(user) => users.push(user),
            None => {
                println!("{}", "No pending review requests.".muted());
                return Ok(());
            }
        }
    }

    let fingerprints = index.fingerprints_for_users(&users);
    if fingerprints.is_empty() {
        println!(
            "{}",
            format!("No hunks found for user {}", users.join(",")).warn()
        );
        return Ok(());
    }

    // =========================================================================
    // Phase 2: DECIDE
    // =========================================================================

    let engine = DecisionEngine::new(&index, DecisionOptions { propagate });
    let mut input = TerminalInput;
    let pass = engine
        .run(&fingerprints, &mut input, ctx.platform.as_ref(), &TerminalObserver)
        .await?;

    let DecisionPass::Completed(session) = pass else {
        println!("{}", "Quitting manual review early. Nothing was approved.".muted());
        return Ok(());
    };

    // =========================================================================
    // Phase 3: COMMIT
    // =========================================================================

    let plan = create_commit_plan(&index, &session);
    if plan.steps.is_empty() {
        println!("{}", "No PRs were decided.".muted());
        return Ok(());
    }

    if options.confirm && !dry_run {
        report_commit_plan(&plan);
        if plan.is_empty() {
            println!("{}", "No PRs are ready to approve.".muted());
            return Ok(());
        }
        if !Confirm::new()
            .with_prompt("Proceed with approval?")
            .default(true)
            .interact()
            .map_err(|e| Error::Input(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    let verb = if dry_run { "Would approve" } else { "Approving" };
    println!();
    println!(
        "{} {}",
        verb.emphasis(),
        format!("{} PR(s)...", plan.approve_count()).accent()
    );

    let progress = if options.verbose {
        CliProgress::verbose()
    } else {
        CliProgress::compact()
    };
    let report = execute_commit(&plan, ctx.platform.as_ref(), &progress, dry_run).await;

    print_commit_summary(&report);

    let failed = report.failed().count();
    if failed > 0 {
        return Err(Error::Platform(format!(
            "{failed} PR(s) could not be approved; rerun `hunk-review manual` once resolved"
        )));
    }
    Ok(())
}

/// Report what would be approved
fn report_commit_plan(plan: &CommitPlan) {
    println!("{}:", "Approval plan".emphasis());
    println!();

    for step in &plan.steps {
        match step {
            CommitStep::Approve { pr } => {
                println!("  {} {}: {}", "✓ Would approve".success(), pr.label(), pr.title);
            }
            CommitStep::Skip { pr, reason } => {
                println!("  {} {}", "✗ Would skip".warn(), pr.label());
                println!("    - {}", reason.to_string().muted());
            }
        }
    }
    println!();
}

/// Print commit summary
fn print_commit_summary(report: &CommitReport) {
    println!();
    if report.is_success() {
        println!("{} Review complete!", check());
    } else {
        println!("{} Review partially complete", "⚠️".warn());
    }

    for entry in &report.entries {
        let status = match &entry.outcome {
            CommitOutcome::Approved(MergeRoute::AutoMerge) => {
                "approved, auto-merge enabled".success()
            }
            CommitOutcome::Approved(MergeRoute::SquashMerged) => {
                "approved, squash merged".success()
            }
            CommitOutcome::WouldApprove => "[dry-run] would approve".warn(),
            CommitOutcome::NotAttempted(reason) => format!("not approved: {reason}").muted(),
            CommitOutcome::Failed { step, message } => {
                format!("failed to {step}: {message}").error()
            }
        };
        println!("   {} {status}", entry.label.accent());
        for warning in &entry.warnings {
            println!("      {}", warning.muted());
        }
    }
}
