// tests/database.rs

//! Repository database generation and listing tests.

mod common;

use bpm_utils::database::{DATABASE_FILE, DATABASE_VERSION};
use bpm_utils::{build_database, list_packages, update_repository, BinaryStatus, BpmDatabase, Error};
use common::{package_info, setup_repository, write_archive};
use std::fs;

#[test]
fn test_build_database_indexes_archives() {
    let (_temp, repo) = setup_repository();
    let source = repo.join("source");
    write_archive(&source.join("alpha/alpha-1.0-1-src.bpm"), &package_info("alpha", "1.0", 1), None);
    write_archive(&source.join("beta/beta-2.3-4-src.bpm"), &package_info("beta", "2.3", 4), Some(512));

    let db = build_database(&source).unwrap();
    assert_eq!(db.database_version, DATABASE_VERSION);
    assert_eq!(db.entries.len(), 2);

    let beta = &db.entries["beta"];
    assert_eq!(beta.info.version, "2.3");
    assert_eq!(beta.info.revision, 4);
    assert_eq!(beta.filepath, "beta/beta-2.3-4-src.bpm");
    assert_eq!(beta.installed_size, 512);
    assert_eq!(
        beta.download_size,
        fs::metadata(source.join(&beta.filepath)).unwrap().len()
    );

    let on_disk = BpmDatabase::read(&source.join(DATABASE_FILE)).unwrap();
    assert_eq!(on_disk, db);
}

#[test]
fn test_build_database_is_idempotent() {
    let (_temp, repo) = setup_repository();
    let source = repo.join("source");
    write_archive(&source.join("zeta.bpm"), &package_info("zeta", "0.9", 2), Some(10));
    write_archive(&source.join("alpha.bpm"), &package_info("alpha", "1.0", 1), None);

    build_database(&source).unwrap();
    let first = fs::read(source.join(DATABASE_FILE)).unwrap();
    build_database(&source).unwrap();
    let second = fs::read(source.join(DATABASE_FILE)).unwrap();

    assert_eq!(first, second);
    let text = String::from_utf8(first).unwrap();
    assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
}

#[test]
fn test_missing_payload_records_zero_installed_size() {
    let (_temp, repo) = setup_repository();
    let source = repo.join("source");
    write_archive(&source.join("meta.bpm"), &package_info("meta", "1", 1), None);

    let db = build_database(&source).unwrap();
    assert_eq!(db.entries["meta"].installed_size, 0);
}

#[test]
fn test_non_archive_files_are_ignored() {
    let (_temp, repo) = setup_repository();
    let source = repo.join("source");
    write_archive(&source.join("pkg/pkg.bpm"), &package_info("pkg", "1", 1), None);
    fs::write(source.join("pkg/pkg.info"), package_info("pkg", "1", 1)).unwrap();
    fs::write(source.join("notes.txt"), "hello").unwrap();

    let db = build_database(&source).unwrap();
    assert_eq!(db.entries.len(), 1);
}

#[test]
fn test_duplicate_package_leaves_previous_database() {
    let (_temp, repo) = setup_repository();
    let source = repo.join("source");
    write_archive(&source.join("a/foo-1.0-1.bpm"), &package_info("foo", "1.0", 1), None);

    build_database(&source).unwrap();
    let before = fs::read(source.join(DATABASE_FILE)).unwrap();

    write_archive(&source.join("b/foo-1.1-1.bpm"), &package_info("foo", "1.1", 1), None);
    let err = build_database(&source).unwrap_err();
    match &err {
        Error::DuplicatePackage { name, first, second } => {
            assert_eq!(name, "foo");
            assert!(first.ends_with("a/foo-1.0-1.bpm"));
            assert!(second.ends_with("b/foo-1.1-1.bpm"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("has already been added to the database"));

    let after = fs::read(source.join(DATABASE_FILE)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_duplicate_package_writes_no_new_database() {
    let (_temp, repo) = setup_repository();
    let source = repo.join("source");
    write_archive(&source.join("one.bpm"), &package_info("dup", "1", 1), None);
    write_archive(&source.join("two.bpm"), &package_info("dup", "2", 1), None);

    assert!(build_database(&source).is_err());
    assert!(!source.join(DATABASE_FILE).exists());
}

#[test]
fn test_corrupt_archive_fails_build() {
    let (_temp, repo) = setup_repository();
    let source = repo.join("source");
    fs::write(source.join("broken.bpm"), vec![0x42u8; 700]).unwrap();

    assert!(build_database(&source).is_err());
    assert!(!source.join(DATABASE_FILE).exists());
}

#[test]
fn test_update_repository_skips_missing_binary_dir() {
    let (_temp, repo) = setup_repository();
    write_archive(&repo.join("source/x.bpm"), &package_info("x", "1", 1), None);

    let updates = update_repository(&repo);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].kind, "source");
    assert!(updates[0].result.is_ok());
    assert!(!repo.join("binary").exists());
}

#[test]
fn test_update_repository_failure_is_independent() {
    let (_temp, repo) = setup_repository();
    write_archive(&repo.join("source/a.bpm"), &package_info("same", "1", 1), None);
    write_archive(&repo.join("source/b.bpm"), &package_info("same", "1", 1), None);
    write_archive(&repo.join("binary/same.bpm"), &package_info("same", "1", 1), Some(8));

    let updates = update_repository(&repo);
    assert_eq!(updates.len(), 2);
    assert!(updates[0].result.is_err());
    assert_eq!(updates[1].kind, "binary");
    assert!(updates[1].result.is_ok());
    assert!(repo.join("binary").join(DATABASE_FILE).exists());
}

#[test]
fn test_list_packages_reports_binary_state() {
    let (_temp, repo) = setup_repository();
    write_archive(&repo.join("source/a.bpm"), &package_info("built", "1.0", 1), None);
    write_archive(&repo.join("source/b.bpm"), &package_info("stale", "2.0", 1), None);
    write_archive(&repo.join("source/c.bpm"), &package_info("unbuilt", "3.0", 1), None);
    write_archive(&repo.join("binary/a.bpm"), &package_info("built", "1.0", 1), Some(4));
    write_archive(&repo.join("binary/b.bpm"), &package_info("stale", "1.9", 1), Some(4));

    for update in update_repository(&repo) {
        update.result.unwrap();
    }

    let rows = list_packages(&repo).unwrap();
    let status: Vec<(&str, &BinaryStatus)> =
        rows.iter().map(|r| (r.name.as_str(), &r.binary)).collect();
    assert_eq!(
        status,
        vec![
            ("built", &BinaryStatus::Present),
            (
                "stale",
                &BinaryStatus::VersionMismatch {
                    binary_version: "1.9-1".to_string()
                }
            ),
            ("unbuilt", &BinaryStatus::Missing),
        ]
    );
    assert_eq!(rows[1].full_version, "2.0-1");
}

#[test]
fn test_list_packages_without_database_is_empty() {
    let (_temp, repo) = setup_repository();
    assert!(list_packages(&repo).unwrap().is_empty());
}
