//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::Display;

/// Check mark used in summaries
pub const CHECK: &str = "✓";

/// Semantic styles for terminal output
///
/// Colors are dropped when the stream is not a color-capable terminal.
pub trait Stylize: Display + Sized {
    /// Secondary information
    fn muted(&self) -> String {
        self.styled(Style::new().dimmed())
    }

    /// Headings and key terms
    fn emphasis(&self) -> String {
        self.styled(Style::new().bold())
    }

    /// Identifiers (PRs, fingerprints, users)
    fn accent(&self) -> String {
        self.styled(Style::new().cyan())
    }

    /// Completed actions
    fn success(&self) -> String {
        self.styled(Style::new().green())
    }

    /// Things that need attention
    fn warn(&self) -> String {
        self.styled(Style::new().yellow())
    }

    /// Failures
    fn error(&self) -> String {
        self.styled(Style::new().red().bold())
    }

    /// Added diff lines
    fn added(&self) -> String {
        self.styled(Style::new().green())
    }

    /// Removed diff lines
    fn removed(&self) -> String {
        self.styled(Style::new().red())
    }

    /// Apply `style` when stdout supports color
    fn styled(&self, style: Style) -> String {
        self.if_supports_color(Stream::Stdout, |s| s.style(style))
            .to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Arrow used for nested items
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner style shared by long-running steps
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}

/// Color a diff line by its leading `+`/`-`
pub fn diff_line(line: &str) -> String {
    if line.starts_with('+') {
        line.added()
    } else if line.starts_with('-') {
        line.removed()
    } else {
        line.to_string()
    }
}

/// Render `url` as a clickable link when the terminal supports it
pub fn hyperlink(text: &str, url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(text, url).to_string()
    } else {
        text.to_string()
    }
}
