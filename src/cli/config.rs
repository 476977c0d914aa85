//! Config command - write or print the configuration

use crate::cli::context::{GlobalOptions, resolve_config};
use crate::cli::style::{Stylize, check};
use anstream::println;
use hunk_review::config::{Config, config_path, save_config};
use hunk_review::error::{Error, Result};

/// Write a default config file unless one exists (or `force`)
pub fn run_config_init(options: &GlobalOptions, force: bool) -> Result<()> {
    let path = config_path(options.config.as_deref())?;
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    save_config(&path, &Config::default())?;
    println!("{} Wrote {}", check(), path.display().accent());
    Ok(())
}

/// Print the effective configuration
pub fn run_config_show(options: &GlobalOptions) -> Result<()> {
    let (config, path) = resolve_config(options)?;
    let state = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("{} {}{}", "Config:".emphasis(), path.display().accent(), state.muted());
    println!();

    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
    println!("{}", rendered.trim_end());
    Ok(())
}
