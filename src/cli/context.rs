//! Shared command context for CLI commands
//!
//! Extracts the setup shared by users, show, lookup and manual.

use crate::cli::style::{Stylize, check, spinner_style};
use hunk_review::auth::get_github_auth;
use hunk_review::collect::{ReviewIndex, collect_review_index};
use hunk_review::config::{Config, config_path, load_config};
use hunk_review::error::{Error, Result};
use hunk_review::platform::{GitHubService, ReviewPlatform};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Global flags that override the config file
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// GitHub Enterprise host
    pub host: Option<String>,
    /// Collection concurrency
    pub concurrency: Option<usize>,
}

/// Effective configuration: file values with flags applied
pub fn resolve_config(options: &GlobalOptions) -> Result<(Config, PathBuf)> {
    let path = config_path(options.config.as_deref())?;
    let mut config = load_config(&path)?;

    if let Some(host) = &options.host {
        config.host = Some(host.clone());
    }
    if let Some(concurrency) = options.concurrency {
        if concurrency == 0 {
            return Err(Error::Config("--concurrency must be at least 1".to_string()));
        }
        config.concurrency = concurrency;
    }

    Ok((config, path))
}

/// Shared context for commands that talk to GitHub
pub struct CommandContext {
    /// Effective configuration
    pub config: Config,
    /// Where the configuration was read from
    pub config_path: PathBuf,
    /// Platform service
    pub platform: Box<dyn ReviewPlatform>,
}

impl CommandContext {
    /// Load configuration, authenticate and create the platform service
    pub async fn new(options: &GlobalOptions) -> Result<Self> {
        let (config, config_path) = resolve_config(options)?;

        let auth = get_github_auth(config.host.as_deref()).await?;
        debug!(source = %auth.source, "authenticated");

        let platform =
            GitHubService::new(&auth.token, config.host.as_deref(), config.lookback_days)?;

        Ok(Self {
            config,
            config_path,
            platform: Box::new(platform),
        })
    }

    /// Collect the review index behind a spinner
    pub async fn collect(&self) -> Result<ReviewIndex> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message("Collecting review requests...".to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        match collect_review_index(self.platform.as_ref(), self.config.concurrency).await {
            Ok(index) => {
                spinner.finish_with_message(format!(
                    "{} Collected {} PR(s), {} distinct hunk(s)",
                    check(),
                    index.pull_requests().count().accent(),
                    index.fingerprint_count().accent()
                ));
                Ok(index)
            }
            Err(e) => {
                spinner.finish_and_clear();
                Err(e)
            }
        }
    }
}
