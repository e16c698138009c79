// tests/repository.rs

//! Repository creation and discovery tests.

mod common;

use bpm_utils::repository::{load_env_file, REPO_CONFIG_FILE};
use bpm_utils::{create_repository, locate_repository_from, Error, RepoConfig};
use common::setup_repository;
use std::fs;

#[test]
fn test_create_repository_layout() {
    let (_temp, repo) = setup_repository();

    assert!(repo.join(REPO_CONFIG_FILE).is_file());
    assert!(repo.join("source").is_dir());

    let config = RepoConfig::load(&repo).unwrap();
    assert_eq!(config.name, "test-repo");
    assert_eq!(config.description, "Test repository");
}

#[test]
fn test_create_repository_refuses_existing_dir() {
    let (temp, _repo) = setup_repository();
    let err = create_repository(temp.path(), "test-repo", "again").unwrap_err();
    assert!(matches!(err, Error::RepositoryExists(_)));
}

#[test]
fn test_locate_from_nested_package_dir() {
    let (_temp, repo) = setup_repository();
    let nested = repo.join("source/foo/patches");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(locate_repository_from(&nested), Some(repo.clone()));
    assert_eq!(locate_repository_from(&repo), Some(repo));
}

#[test]
fn test_locate_outside_repository() {
    let temp = tempfile::tempdir().unwrap();
    assert_eq!(locate_repository_from(temp.path()), None);
}

#[test]
fn test_env_file_errors_on_bad_line() {
    let (_temp, repo) = setup_repository();
    fs::write(repo.join(".env"), "GOOD=1\nBAD=a=b\n").unwrap();

    let err = load_env_file(&repo).unwrap_err();
    assert!(matches!(err, Error::EnvFormat { line: 2 }));
}
