//! Lookup command - find the PRs that contain given hunks

use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::show::{print_change_lines, print_linked};
use crate::cli::style::Stylize;
use anstream::println;
use hunk_review::error::Result;
use hunk_review::fingerprint::Fingerprint;

/// Run the lookup command
pub async fn run_lookup(options: &GlobalOptions, fingerprints: &[String]) -> Result<()> {
    let ctx = CommandContext::new(options).await?;
    let index = ctx.collect().await?;

    for raw in fingerprints {
        let fingerprint = Fingerprint::from(raw.trim().to_ascii_lowercase());
        let prs = index.prs_for(&fingerprint);
        println!();
        if prs.is_empty() {
            println!(
                "{} {}",
                "No PRs found for hunk".warn(),
                fingerprint.as_str().accent()
            );
            continue;
        }

        println!(
            "{} {} in {} PR(s)",
            "Hunk".emphasis(),
            fingerprint.as_str().accent(),
            prs.len()
        );
        print_change_lines(&index, &fingerprint, "    ");
        for pr in prs {
            print_linked(&index, pr, &fingerprint);
        }
    }

    Ok(())
}
