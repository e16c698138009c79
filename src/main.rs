// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::CreateRepo { name, description } => {
            commands::cmd_create_repo(&name, &description)
        }
        Commands::UpdateDb => commands::cmd_update_db(),
        Commands::List => commands::cmd_list(),
        Commands::CheckVersions {
            show_skipped,
            force,
            apply,
            packages,
        } => {
            // Per-command verbose also surfaces the skip warnings
            commands::cmd_check_versions(show_skipped || cli.verbose, force, apply, packages)
        }
        Commands::Checksums { directory, write } => commands::cmd_checksums(&directory, write),
    }
}
