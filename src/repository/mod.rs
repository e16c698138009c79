// src/repository/mod.rs

//! BPM repository layout
//!
//! A repository is a directory containing a `bpm-repo.conf` marker file,
//! a `source/` tree of package directories and archives, and optionally a
//! `binary/` directory of compiled archives. This module locates the
//! enclosing repository, reads its configuration, and creates new ones.

mod env;

use crate::database::SOURCE_DIR;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use env::{load_env_file, parse_env, ENV_FILE};

/// Marker file identifying a repository root
pub const REPO_CONFIG_FILE: &str = "bpm-repo.conf";

/// Contents of `bpm-repo.conf`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl RepoConfig {
    /// Read the configuration of the repository rooted at `repo_root`
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = repo_root.join(REPO_CONFIG_FILE);
        let data = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;

        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(&data)
            .map_err(|e| Error::MalformedDescriptor(format!("{}: {}", path.display(), e)))
    }
}

/// Find the repository enclosing the current working directory
pub fn locate_repository() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    locate_repository_from(&cwd)
}

/// Walk upward from `start` looking for `bpm-repo.conf`
///
/// The filesystem root itself is never treated as a repository.
pub fn locate_repository_from(start: &Path) -> Option<PathBuf> {
    let found = start
        .ancestors()
        .take_while(|dir| dir.parent().is_some())
        .find(|dir| dir.join(REPO_CONFIG_FILE).is_file())
        .map(Path::to_path_buf);

    if let Some(repo) = &found {
        debug!("Found repository at {}", repo.display());
    }
    found
}

/// Create a new repository directory `<parent>/<name>`
pub fn create_repository(parent: &Path, name: &str, description: &str) -> Result<PathBuf> {
    let root = parent.join(name);
    if root.exists() {
        return Err(Error::RepositoryExists(root));
    }

    fs::create_dir(&root)?;

    let config = RepoConfig {
        name: name.to_string(),
        description: description.to_string(),
    };
    let contents = serde_yaml::to_string(&config)
        .map_err(|e| Error::MalformedDescriptor(e.to_string()))?;
    fs::write(root.join(REPO_CONFIG_FILE), contents)?;
    fs::create_dir(root.join(SOURCE_DIR))?;

    info!("Created repository {} at {}", name, root.display());
    Ok(root)
}
