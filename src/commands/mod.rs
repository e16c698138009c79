// src/commands/mod.rs
//! Command handlers for the `bpm-repo` CLI

mod checksums;
mod repo;
mod versions;

use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub use checksums::cmd_checksums;
pub use repo::{cmd_create_repo, cmd_list, cmd_update_db};
pub use versions::cmd_check_versions;

/// Resolve the repository enclosing the working directory or fail
pub fn require_repository() -> Result<PathBuf> {
    bpm_utils::locate_repository()
        .ok_or_else(|| anyhow!("this command may only be run inside a BPM repository"))
}
