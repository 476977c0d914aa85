//! Command implementations for the `hunk-review` binary

pub mod config;
pub mod context;
pub mod lookup;
pub mod manual;
pub mod show;
pub mod style;
pub mod users;

use anstream::{eprintln, println};
use async_trait::async_trait;
use hunk_review::progress::ProgressCallback;
use style::Stylize;

/// Progress printer for the commit stage
#[derive(Debug, Clone, Copy, Default)]
pub struct CliProgress {
    verbose: bool,
}

impl CliProgress {
    /// One line per PR
    pub const fn compact() -> Self {
        Self { verbose: false }
    }

    /// Also echo warnings to stderr as they happen
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("{message}");
    }

    async fn on_warning(&self, message: &str) {
        println!("   {}", format!("⚠️  {message}").warn());
        if self.verbose {
            eprintln!("{}", message.muted());
        }
    }
}
