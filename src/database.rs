// src/database.rs

//! Repository package databases
//!
//! Each of a repository's `source/` and `binary/` directories carries a
//! `database.bpmdb` index describing every `.bpm` archive below it. The
//! index is always regenerated from scratch: either the whole directory is
//! scanned successfully and the new index replaces the old one atomically,
//! or the previous index is left untouched.

use crate::archive;
use crate::error::{Error, Result};
use crate::package::PackageInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File name of the index inside a scanned directory
pub const DATABASE_FILE: &str = "database.bpmdb";

/// Schema version written into new databases
pub const DATABASE_VERSION: u32 = 2;

/// Repository subdirectory holding source archives
pub const SOURCE_DIR: &str = "source";

/// Repository subdirectory holding binary archives
pub const BINARY_DIR: &str = "binary";

/// Index of one directory's package archives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpmDatabase {
    pub database_version: u32,
    /// Entries keyed by package name
    #[serde(default)]
    pub entries: BTreeMap<String, BpmDatabaseEntry>,
}

/// One archive's record in a [`BpmDatabase`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpmDatabaseEntry {
    pub info: PackageInfo,
    /// Archive path relative to the scanned directory
    pub filepath: String,
    /// Archive size on disk, in bytes
    pub download_size: u64,
    /// Size of the installable payload; 0 when the archive has none
    pub installed_size: u64,
}

impl Default for BpmDatabase {
    fn default() -> Self {
        Self {
            database_version: DATABASE_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl BpmDatabase {
    /// Read a database file
    pub fn read(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;
        serde_yaml::from_slice(&data)
            .map_err(|e| Error::Database(format!("{}: {}", path.display(), e)))
    }

    /// Scan `dir` recursively and build an index of its archives
    ///
    /// Nothing is written; see [`build_database`] for the full operation.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut database = Self::default();
        // Archive that first claimed each name, for duplicate reporting
        let mut claimed: BTreeMap<String, PathBuf> = BTreeMap::new();

        let walker = WalkDir::new(dir).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("directory walk failed")
                }))
            })?;

            if !entry.file_type().is_file() || !archive::is_archive_path(entry.path()) {
                continue;
            }

            let record = index_archive(dir, entry.path())?;
            let name = record.info.name.clone();

            if let Some(first) = claimed.get(&name) {
                return Err(Error::DuplicatePackage {
                    name,
                    first: first.clone(),
                    second: entry.path().to_path_buf(),
                });
            }

            debug!("Indexed {} as {}", record.filepath, name);
            claimed.insert(name.clone(), entry.path().to_path_buf());
            database.entries.insert(name, record);
        }

        Ok(database)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Database(e.to_string()))
    }

    /// Write the database to `path` via a temporary file and rename
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let data = self.to_yaml()?;
        let parent = path.parent().unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(data.as_bytes())?;
        temp.as_file().sync_all()?;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o644))?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

/// Build one entry from an archive on disk
fn index_archive(dir: &Path, path: &Path) -> Result<BpmDatabaseEntry> {
    let download_size = fs::metadata(path)?.len();

    let filepath = path
        .strip_prefix(dir)
        .map_err(|_| Error::NotFound(format!("{} is not under {}", path.display(), dir.display())))?
        .to_string_lossy()
        .into_owned();

    let installed_size = archive::payload_size(path)?.unwrap_or(0);
    let info = archive::read_package_info(path)?;

    if info.name.is_empty() {
        return Err(Error::MalformedDescriptor(format!(
            "{}: package name is empty",
            path.display()
        )));
    }

    Ok(BpmDatabaseEntry {
        info,
        filepath,
        download_size,
        installed_size,
    })
}

/// Regenerate `<dir>/database.bpmdb` from the archives below `dir`
///
/// Any failure leaves a previously written database untouched.
pub fn build_database(dir: &Path) -> Result<BpmDatabase> {
    let database = BpmDatabase::scan(dir)?;
    database.write_atomic(&dir.join(DATABASE_FILE))?;
    debug!("Wrote {}", dir.join(DATABASE_FILE).display());
    Ok(database)
}

/// Outcome of regenerating one of a repository's databases
#[derive(Debug)]
pub struct DatabaseUpdate {
    /// `source` or `binary`
    pub kind: &'static str,
    pub path: PathBuf,
    pub result: Result<BpmDatabase>,
}

/// Regenerate the source and binary databases of a repository
///
/// Each directory is an independent unit: a missing directory is skipped,
/// and a failure in one does not prevent the other from being rebuilt.
pub fn update_repository(repo_root: &Path) -> Vec<DatabaseUpdate> {
    [SOURCE_DIR, BINARY_DIR]
        .into_iter()
        .filter_map(|kind| {
            let dir = repo_root.join(kind);
            if !dir.is_dir() {
                debug!("Skipping missing {} directory", kind);
                return None;
            }
            let result = build_database(&dir);
            if let Err(e) = &result {
                debug!("Could not generate {} directory database: {}", kind, e);
            }
            Some(DatabaseUpdate {
                kind,
                path: dir.join(DATABASE_FILE),
                result,
            })
        })
        .collect()
}

/// State of a source package's binary counterpart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryStatus {
    Present,
    Missing,
    VersionMismatch { binary_version: String },
}

/// One row of a repository listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageListing {
    pub name: String,
    /// Source `version-revision`
    pub full_version: String,
    pub binary: BinaryStatus,
}

/// Compare a source database against a binary database
///
/// Split packages are listed individually under their parent's version.
pub fn compare_databases(source: &BpmDatabase, binary: &BpmDatabase) -> Vec<PackageListing> {
    let mut rows = Vec::new();

    for entry in source.entries.values() {
        let full_version = entry.info.full_version();
        for name in entry.info.listed_names() {
            let status = match binary.entries.get(name) {
                None => BinaryStatus::Missing,
                Some(bin) if bin.info.full_version() != full_version => {
                    BinaryStatus::VersionMismatch {
                        binary_version: bin.info.full_version(),
                    }
                }
                Some(_) => BinaryStatus::Present,
            };
            rows.push(PackageListing {
                name: name.to_string(),
                full_version: full_version.clone(),
                binary: status,
            });
        }
    }

    rows
}

/// List a repository's source packages with the state of their binaries
pub fn list_packages(repo_root: &Path) -> Result<Vec<PackageListing>> {
    let source_path = repo_root.join(SOURCE_DIR).join(DATABASE_FILE);
    let source = match BpmDatabase::read(&source_path) {
        Ok(db) => db,
        Err(e) => {
            warn!("Could not read source database: {}", e);
            return Ok(Vec::new());
        }
    };

    let binary_path = repo_root.join(BINARY_DIR).join(DATABASE_FILE);
    let binary = match BpmDatabase::read(&binary_path) {
        Ok(db) => db,
        Err(Error::NotFound(_)) => BpmDatabase::default(),
        Err(e) => return Err(e),
    };

    Ok(compare_databases(&source, &binary))
}
