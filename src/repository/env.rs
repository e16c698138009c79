// src/repository/env.rs

//! Repository `.env` files
//!
//! Values are collected into a map that callers hand to child processes;
//! the current process environment is never modified.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Name of the environment file at a repository root
pub const ENV_FILE: &str = ".env";

/// Parse `KEY=VALUE` lines; blank lines and `#` comments are skipped
pub fn parse_env(contents: &str) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('=').collect();
        match parts.as_slice() {
            [key, value] => {
                vars.insert(key.to_string(), value.to_string());
            }
            _ => return Err(Error::EnvFormat { line: index + 1 }),
        }
    }

    Ok(vars)
}

/// Load `<repo_root>/.env`; a missing file yields an empty map
pub fn load_env_file(repo_root: &Path) -> Result<BTreeMap<String, String>> {
    match fs::read_to_string(repo_root.join(ENV_FILE)) {
        Ok(contents) => parse_env(&contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}
