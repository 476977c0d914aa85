//! Cleanup of generated PR descriptions
//!
//! Dependabot bodies carry HTML markup and a long command reference at the
//! bottom. Neither helps when deciding on a hunk.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `<...>` tags, an unterminated trailing `<...`, and stray `>`
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]*>?|>").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// How far past a line mentioning dependabot to look for command keywords
const LOOKAHEAD_LINES: usize = 8;

/// Strip markup and the Dependabot command block from a PR body
pub fn clean_pr_body(input: &str) -> String {
    let without_html = HTML_TAG.replace_all(input, "");
    let trimmed = remove_dependabot_commands(&without_html);
    collapse_newlines(&trimmed)
}

fn starts_command_block(line: &str) -> bool {
    let trim = line.trim();
    let low = trim.to_lowercase();
    low.contains("dependabot commands and options")
        || low.contains("you can trigger dependabot actions by commenting on this pr")
        || low.starts_with("- `@dependabot")
        || low.starts_with("`@dependabot")
        || trim.starts_with("@dependabot")
}

fn mentions_commands_ahead(lines: &[&str], from: usize) -> bool {
    let end = (from + LOOKAHEAD_LINES).min(lines.len());
    let ahead = lines[from..end].join(" \n ").to_lowercase();
    ["@dependabot", "rebase", "recreate", "merge"]
        .iter()
        .any(|k| ahead.contains(k))
}

fn join_without_trailing_blanks(mut out: Vec<&str>) -> String {
    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn remove_dependabot_commands(input: &str) -> String {
    if input.trim().is_empty() {
        return input.to_string();
    }

    let lines: Vec<&str> = input.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        if starts_command_block(line)
            || (line.to_lowercase().contains("dependabot") && mentions_commands_ahead(&lines, i))
        {
            return join_without_trailing_blanks(out);
        }
        out.push(*line);
    }

    out.join("\n")
        .trim_end_matches(['\n', '\r', ' ', '\t'])
        .to_string()
}

/// Keep at most two consecutive newlines
fn collapse_newlines(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut run = 0;
    for c in input.chars() {
        if c == '\n' {
            run += 1;
            if run <= 2 {
                result.push(c);
            }
        } else {
            run = 0;
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_dependabot_command_block() {
        let input = "Some description of the PR.\n\nMore details here.\n\n\
Dependabot commands and options\n\n\n\
You can trigger Dependabot actions by commenting on this PR:\n\
- `@dependabot rebase` will rebase this PR\n\
- `@dependabot recreate` will recreate this PR, overwriting any edits that have been made to it\n\
- `@dependabot merge` will merge this PR after your CI passes on it\n";

        assert_eq!(
            remove_dependabot_commands(input),
            "Some description of the PR.\n\nMore details here."
        );
    }

    #[test]
    fn test_block_starting_with_mention() {
        let input = "Line1\nLine2\n@dependabot rebase\n- `@dependabot rebase`\n";
        assert_eq!(remove_dependabot_commands(input), "Line1\nLine2");
    }

    #[test]
    fn test_no_block_trims_trailing_whitespace() {
        let input = "Just a body with trailing whitespace\n\n";
        assert_eq!(
            remove_dependabot_commands(input),
            "Just a body with trailing whitespace"
        );
    }

    #[test]
    fn test_blank_input_is_returned_as_is() {
        assert_eq!(remove_dependabot_commands("  \n"), "  \n");
    }

    #[test]
    fn test_strips_html_tags() {
        let body = "<details><summary>Release notes</summary>\n<p>Fixed a bug</p>\n</details>";
        assert_eq!(clean_pr_body(body), "Release notes\nFixed a bug");
    }

    #[test]
    fn test_unterminated_tag_drops_rest() {
        assert_eq!(clean_pr_body("keep <img src=\"x\""), "keep");
    }

    #[test]
    fn test_collapses_newline_runs() {
        assert_eq!(collapse_newlines("a\n\n\n\nb\nc"), "a\n\nb\nc");
    }

    #[test]
    fn test_full_dependabot_body() {
        let body = "Bumps <a href=\"https://github.com/serde-rs/serde\">serde</a> from 1.0.200 to 1.0.210.\n\n\n\n\
<details>\n<summary>Commits</summary>\n<ul>\n<li>abc123 release</li>\n</ul>\n</details>\n<br />\n\n\
Dependabot will resolve any conflicts with this PR as long as you don't alter it yourself. \
You can also trigger a rebase manually by commenting `@dependabot rebase`.\n";
        let cleaned = clean_pr_body(body);
        assert!(cleaned.starts_with("Bumps serde from 1.0.200 to 1.0.210."));
        assert!(cleaned.contains("abc123 release"));
        assert!(!cleaned.to_lowercase().contains("dependabot"));
        assert!(!cleaned.contains("\n\n\n"));
    }
}
