//! Users command - list authors with pending review work

use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::style::Stylize;
use anstream::println;
use hunk_review::error::Result;
use std::collections::BTreeSet;

/// Run the users command
pub async fn run_users(options: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(options).await?;
    let index = ctx.collect().await?;

    let users = index.users();
    if users.is_empty() {
        println!("{}", "No pending review requests.".muted());
        return Ok(());
    }

    for user in users {
        let Some(fingerprints) = index.user_fingerprints(user) else {
            continue;
        };
        let prs: BTreeSet<&str> = fingerprints
            .values()
            .flatten()
            .map(String::as_str)
            .collect();
        println!(
            "{}  {}",
            user.warn(),
            format!("{} hunk(s) in {} PR(s)", fingerprints.len(), prs.len()).muted()
        );
    }

    Ok(())
}
