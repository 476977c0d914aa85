//! hunk-review - review pending PRs one hunk at a time

mod cli;

use anstream::eprintln;
use clap::{Args, Parser, Subcommand};
use cli::context::GlobalOptions;
use cli::manual::ManualOptions;
use cli::style::Stylize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hunk-review")]
#[command(about = "Triage pending GitHub review requests one diff hunk at a time")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (default: <config dir>/hunk-review/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub Enterprise host (default: github.com)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Number of PRs fetched at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List users with pending review requests
    Users,

    /// Show pending hunks per user with their PRs
    Show {
        /// Only these users (comma-separated, case-insensitive)
        #[arg(short, long)]
        user: Vec<String>,
    },

    /// Find the PRs that contain the given hunk fingerprints
    Lookup {
        /// Fingerprints to look up
        #[arg(required = true)]
        fingerprints: Vec<String>,
    },

    /// Decide hunk by hunk, then approve PRs whose hunks were all approved
    Manual {
        /// Users to review (comma-separated); prompts when omitted
        #[arg(short, long)]
        user: Vec<String>,

        /// Approving a hunk also approves the other hunks of its PRs
        #[arg(short, long)]
        propagate: bool,

        /// Show what would be approved without approving
        #[arg(short, long)]
        dry_run: bool,

        /// Preview the approval plan and ask before approving
        #[arg(long)]
        confirm: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "hunk_review=debug,info",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = GlobalOptions {
        config: cli.global.config,
        host: cli.global.host,
        concurrency: cli.global.concurrency,
    };

    let result = match cli.command {
        Commands::Users => cli::users::run_users(&global).await,
        Commands::Show { user } => cli::show::run_show(&global, &user).await,
        Commands::Lookup { fingerprints } => cli::lookup::run_lookup(&global, &fingerprints).await,
        Commands::Manual {
            user,
            propagate,
            dry_run,
            confirm,
        } => {
            cli::manual::run_manual(
                &global,
                ManualOptions {
                    users: user,
                    propagate,
                    dry_run,
                    confirm,
                    verbose: cli.global.verbose > 0,
                },
            )
            .await
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => cli::config::run_config_init(&global, force),
            ConfigAction::Show => cli::config::run_config_show(&global),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
