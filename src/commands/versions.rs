// src/commands/versions.rs
//! Upstream version checks

use anyhow::{Context, Result};
use bpm_utils::repository::load_env_file;
use bpm_utils::version::{CheckOptions, ScriptRunner, VersionChecker};
use bpm_utils::BpmPackageCommand;
use tracing::warn;

use super::require_repository;

/// Check every (or the named) source package for a newer upstream version
pub fn cmd_check_versions(
    verbose: bool,
    force: bool,
    apply: bool,
    packages: Vec<String>,
) -> Result<()> {
    let repo = require_repository()?;
    let env = load_env_file(&repo).context("could not read environment file")?;

    let archiver = BpmPackageCommand::default();
    let checker = VersionChecker::new(&repo, ScriptRunner::new(env), &archiver);
    let options = CheckOptions {
        force,
        apply,
        packages,
    };

    let report = checker
        .check_all(&options)
        .context("could not check package versions")?;

    let updates = report.updates();
    for (name, old, new) in &updates {
        println!("Update available for package ({}): {} -> {}", name, old, new);
    }

    let ignored = report.ignored();
    let missing = report.missing_script();
    if verbose {
        for name in &ignored {
            warn!("package ({}) was ignored", name);
        }
        for name in &missing {
            warn!("package ({}) has no check-version.sh script", name);
        }
    }

    let errors = report.errors();
    for (name, cause) in &errors {
        eprintln!(
            "Error: check-version.sh script for package ({}) failed: {}",
            name, cause
        );
    }

    println!("----- Summary -----");
    println!("Available updates: {}", updates.len());
    println!("Up to date: {}", report.up_to_date_count());
    println!("Missing script: {}", missing.len());
    println!("Ignored: {}", ignored.len());
    println!("Errors: {}", errors.len());
    Ok(())
}
