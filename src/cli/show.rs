//! Show and lookup output shared by both commands

use crate::cli::context::{CommandContext, GlobalOptions};
use crate::cli::style::{Stylize, arrow, diff_line, hyperlink};
use anstream::println;
use hunk_review::collect::ReviewIndex;
use hunk_review::error::Result;
use hunk_review::fingerprint::Fingerprint;
use hunk_review::types::PullRequest;

/// Split a comma-separated user filter
pub fn parse_user_filter(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn print_change_lines(index: &ReviewIndex, fingerprint: &Fingerprint, indent: &str) {
    match index.changes_for(fingerprint) {
        Some(lines) => {
            for line in lines {
                println!("{indent}{}", diff_line(line));
            }
        }
        None => println!("{indent}{}", "(no change lines recorded)".muted()),
    }
}

pub(crate) fn print_pr_line(pr: &PullRequest, indent: &str) {
    println!(
        "{indent}{} {} {}",
        arrow(),
        hyperlink(&pr.label(), &pr.html_url).accent(),
        pr.title
    );
}

/// The PR and the other fingerprints it contains
pub(crate) fn print_linked(index: &ReviewIndex, pr: &PullRequest, fingerprint: &Fingerprint) {
    print_pr_line(pr, "    ");
    let others: Vec<&Fingerprint> = index
        .fingerprints_of(&pr.html_url)
        .iter()
        .filter(|f| *f != fingerprint)
        .collect();
    if others.is_empty() {
        return;
    }
    println!("      {}", "Also linked in this PR:".warn());
    for other in others {
        println!("        {}", other.as_str().success());
        print_change_lines(index, other, "          ");
    }
}

/// Run the show command
pub async fn run_show(options: &GlobalOptions, user_filter: &[String]) -> Result<()> {
    let ctx = CommandContext::new(options).await?;
    let index = ctx.collect().await?;

    let wanted = parse_user_filter(user_filter);
    let users: Vec<&str> = index
        .users()
        .into_iter()
        .filter(|u| wanted.is_empty() || wanted.iter().any(|w| w.eq_ignore_ascii_case(u)))
        .collect();

    if users.is_empty() {
        println!("{}", "No pending review requests for the selected users.".muted());
        return Ok(());
    }

    for user in users {
        println!();
        println!("{} {}", "User".emphasis(), user.warn());
        let fingerprints = index.fingerprints_for_users(&[user]);
        for fingerprint in &fingerprints {
            println!();
            println!("  {} {}", "Hunk".emphasis(), fingerprint.as_str().accent());
            print_change_lines(&index, fingerprint, "    ");
            for pr in index.user_prs_for(user, fingerprint) {
                print_linked(&index, pr, fingerprint);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_filter_splits_commas() {
        let raw = vec!["alice, bob".to_string(), "dependabot[bot]".to_string(), ",".to_string()];
        assert_eq!(
            parse_user_filter(&raw),
            vec!["alice", "bob", "dependabot[bot]"]
        );
    }
}
