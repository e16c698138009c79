// src/lib.rs

//! BPM repository tooling
//!
//! Library behind the `bpm-repo` command: it maintains the package
//! databases of a BPM repository and tracks upstream versions of its
//! source packages.
//!
//! # Architecture
//!
//! - [`package`]: `pkg.info` descriptors and download checksum resolution
//! - [`archive`]: reading descriptors and payload sizes out of `.bpm` archives
//! - [`database`]: regenerating and comparing `database.bpmdb` indexes
//! - [`version`]: cached, script-driven upstream version checks
//! - [`repository`]: locating, configuring and creating repositories

pub mod archive;
pub mod archiver;
pub mod database;
mod error;
pub mod hash;
pub mod package;
pub mod repository;
pub mod version;

pub use archiver::{BpmPackageCommand, SourceArchiver};
pub use database::{
    build_database, compare_databases, list_packages, update_repository, BinaryStatus,
    BpmDatabase, BpmDatabaseEntry, DatabaseUpdate, PackageListing,
};
pub use error::{Error, Result};
pub use package::{ChecksumResolver, DownloadKind, PackageDownload, PackageInfo};
pub use repository::{create_repository, locate_repository, locate_repository_from, RepoConfig};
pub use version::{CheckOptions, CheckOutcome, CheckReport, PackageCheck, VersionChecker};
