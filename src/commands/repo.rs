// src/commands/repo.rs
//! Repository management commands

use anyhow::{bail, Context, Result};
use bpm_utils::{BinaryStatus, DatabaseUpdate};
use std::io::{self, Write};
use tracing::info;

use super::require_repository;

/// Create a new repository in the working directory
pub fn cmd_create_repo(name: &str, description: &str) -> Result<()> {
    if bpm_utils::locate_repository().is_some() {
        bail!("this command cannot be run inside a BPM repository");
    }

    let cwd = std::env::current_dir().context("could not determine working directory")?;
    bpm_utils::create_repository(&cwd, name, description)
        .with_context(|| format!("could not create repository '{}'", name))?;

    println!("Repository created successfully!");
    Ok(())
}

/// Regenerate the source and binary databases
pub fn cmd_update_db() -> Result<()> {
    let repo = require_repository()?;
    info!("Updating databases in {}", repo.display());

    let updates = bpm_utils::update_repository(&repo);
    report_updates(updates, &mut io::stdout(), &mut io::stderr())
}

/// Report every database build; fail afterwards if any of them failed
fn report_updates(
    updates: Vec<DatabaseUpdate>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let mut failed = Vec::new();
    for update in updates {
        let kind = update.kind;
        match update.result {
            Ok(database) => {
                info!(
                    "Wrote {} with {} entries",
                    update.path.display(),
                    database.entries.len()
                );
                writeln!(
                    out,
                    "{}{} directory database was generated successfully!",
                    kind[..1].to_uppercase(),
                    &kind[1..]
                )?;
            }
            Err(e) => {
                writeln!(err, "Error: could not generate {} directory database: {}", kind, e)?;
                failed.push(kind);
            }
        }
    }

    if !failed.is_empty() {
        bail!("failed to generate {} database(s)", failed.join(" and "));
    }
    Ok(())
}

/// List source packages with the state of their binaries
pub fn cmd_list() -> Result<()> {
    let repo = require_repository()?;

    for row in bpm_utils::list_packages(&repo)? {
        match row.binary {
            BinaryStatus::Present => println!("{} {}", row.name, row.full_version),
            BinaryStatus::Missing => {
                println!("{} {} (Binary package missing)", row.name, row.full_version)
            }
            BinaryStatus::VersionMismatch { binary_version } => println!(
                "{} {} (Binary package version mismatch: {})",
                row.name, row.full_version, binary_version
            ),
        }
    }
    Ok(())
}
