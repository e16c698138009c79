// src/archiver.rs

//! Source archive creation
//!
//! Building a `-src.bpm` archive from a package directory is delegated to
//! the external `bpm-package` tool; the version tracker calls it after
//! bumping a package's version.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// Creates a source archive for a package directory
pub trait SourceArchiver {
    fn create_source_archive(&self, package_dir: &Path) -> Result<()>;
}

/// Runs `bpm-package` inside the package directory
#[derive(Debug, Clone)]
pub struct BpmPackageCommand {
    program: String,
}

impl Default for BpmPackageCommand {
    fn default() -> Self {
        Self {
            program: "bpm-package".to_string(),
        }
    }
}

impl BpmPackageCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SourceArchiver for BpmPackageCommand {
    fn create_source_archive(&self, package_dir: &Path) -> Result<()> {
        info!("Generating source package in {}", package_dir.display());

        let status = Command::new(&self.program)
            .current_dir(package_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::Command {
                command: self.program.clone(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Command {
                command: self.program.clone(),
                reason: format!("exited with {}", status),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_error() {
        let archiver = BpmPackageCommand::new("/nonexistent/bpm-package");
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            archiver.create_source_archive(dir.path()),
            Err(Error::Command { .. })
        ));
    }
}
