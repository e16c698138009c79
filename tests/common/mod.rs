// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tar::{Builder, Header};
use tempfile::TempDir;

/// Create an empty repository with a `source/` directory.
///
/// Returns (TempDir, repo_root) - keep the TempDir alive to prevent cleanup.
pub fn setup_repository() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = bpm_utils::create_repository(temp_dir.path(), "test-repo", "Test repository")
        .unwrap();
    (temp_dir, root)
}

/// Minimal `pkg.info` contents
pub fn package_info(name: &str, version: &str, revision: u32) -> String {
    format!(
        "name: {name}\ndescription: Test package {name}\nversion: \"{version}\"\nrevision: {revision}\narchitecture: x86_64\ntype: source\n"
    )
}

fn append_member(builder: &mut Builder<Vec<u8>>, path: &str, data: &[u8]) {
    let mut header = Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, data).unwrap();
}

/// Write an uncompressed `.bpm` archive at `path`.
///
/// `payload_size` adds a `files.tar.gz` member with that many bytes.
pub fn write_archive(path: &Path, info: &str, payload_size: Option<usize>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }

    let mut builder = Builder::new(Vec::new());
    append_member(&mut builder, "pkg.info", info.as_bytes());
    if let Some(size) = payload_size {
        append_member(&mut builder, "files.tar.gz", &vec![0u8; size]);
    }
    let data = builder.into_inner().unwrap();
    fs::write(path, data).unwrap();
}

/// Create `source/<dir>/pkg.info`, returning the package directory
pub fn write_package_dir(repo: &Path, dir: &str, info: &str) -> PathBuf {
    let package_dir = repo.join("source").join(dir);
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(package_dir.join("pkg.info"), info).unwrap();
    package_dir
}

/// Install an executable `check-version.sh` with the given body
pub fn write_check_script(package_dir: &Path, body: &str) {
    let path = package_dir.join("check-version.sh");
    fs::write(&path, format!("#!/bin/bash\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Write a `.version-cache` entry with the given age in days
pub fn write_cache_entry(repo: &Path, name: &str, latest: &str, age_days: i64) {
    let timestamp = bpm_utils::version::now_millis() - age_days * 24 * 60 * 60 * 1000;
    let path = repo.join(bpm_utils::version::VERSION_CACHE_FILE);
    let mut existing = fs::read_to_string(&path).unwrap_or_default();
    existing.push_str(&format!(
        "{name}:\n  latest_version: \"{latest}\"\n  timestamp: {timestamp}\n"
    ));
    fs::write(path, existing).unwrap();
}
