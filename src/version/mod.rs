// src/version/mod.rs

//! Upstream version tracking for source packages
//!
//! For every package directory under `source/` the tracker determines the
//! latest upstream version, either from the repository's version cache or
//! by running the package's `check-version.sh`, and compares it with the
//! version recorded in `pkg.info`. Comparison is plain string equality.
//!
//! A check script may print `ignore` to opt its package out; this also
//! drops any cached result so a later un-ignored run probes afresh.
//!
//! Per-package script failures are collected into the report and never
//! stop the run. Failing to read a package's descriptor is fatal.

mod cache;
mod script;

use crate::archiver::SourceArchiver;
use crate::database::SOURCE_DIR;
use crate::error::{Error, Result};
use crate::package::{PackageInfo, PACKAGE_INFO_FILE};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub use cache::{now_millis, CachedVersionEntry, VersionCache, FRESHNESS_WINDOW_MS, VERSION_CACHE_FILE};
pub use script::{ScriptRunner, CHECK_SCRIPT, DEFAULT_SCRIPT_TIMEOUT};

/// Script output meaning "do not track this package"
pub const IGNORE_SENTINEL: &str = "ignore";

/// Options for a version-check run
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Bypass fresh cache entries
    pub force: bool,
    /// Write new versions to `pkg.info` and regenerate source archives
    pub apply: bool,
    /// Package directories relative to `source/`; empty means all
    pub packages: Vec<String>,
}

/// Classification of one package after a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    UpToDate,
    UpdateAvailable { old: String, new: String },
    MissingScript,
    Ignored,
    ScriptError(String),
}

/// Result for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCheck {
    pub name: String,
    pub dir: PathBuf,
    pub outcome: CheckOutcome,
    /// Whether the latest version came from the cache
    pub cached: bool,
}

/// Aggregated results of a run, sorted by package name
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub packages: Vec<PackageCheck>,
}

impl CheckReport {
    fn matching<'a>(
        &'a self,
        pred: impl Fn(&CheckOutcome) -> bool + 'a,
    ) -> impl Iterator<Item = &'a PackageCheck> + 'a {
        self.packages.iter().filter(move |p| pred(&p.outcome))
    }

    /// `(name, old, new)` for every package with an update
    pub fn updates(&self) -> Vec<(&str, &str, &str)> {
        self.packages
            .iter()
            .filter_map(|p| match &p.outcome {
                CheckOutcome::UpdateAvailable { old, new } => {
                    Some((p.name.as_str(), old.as_str(), new.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    /// `(name, cause)` for every package whose check failed
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.packages
            .iter()
            .filter_map(|p| match &p.outcome {
                CheckOutcome::ScriptError(cause) => Some((p.name.as_str(), cause.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn ignored(&self) -> Vec<&str> {
        self.matching(|o| *o == CheckOutcome::Ignored)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn missing_script(&self) -> Vec<&str> {
        self.matching(|o| *o == CheckOutcome::MissingScript)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn up_to_date_count(&self) -> usize {
        self.matching(|o| *o == CheckOutcome::UpToDate).count()
    }

    pub fn get(&self, name: &str) -> Option<&PackageCheck> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Drives version checks for one repository
pub struct VersionChecker<'a> {
    repo_root: PathBuf,
    runner: ScriptRunner,
    archiver: &'a dyn SourceArchiver,
}

impl<'a> VersionChecker<'a> {
    pub fn new(repo_root: &Path, runner: ScriptRunner, archiver: &'a dyn SourceArchiver) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            runner,
            archiver,
        }
    }

    /// Package directories to check, sorted by path
    pub fn candidates(&self, packages: &[String]) -> Result<Vec<PathBuf>> {
        let source = self.repo_root.join(SOURCE_DIR);

        if !packages.is_empty() {
            return packages
                .iter()
                .map(|dir| {
                    let path = source.join(dir);
                    if path.join(PACKAGE_INFO_FILE).is_file() {
                        Ok(path)
                    } else {
                        Err(Error::NotFound(format!(
                            "could not find {} file in directory ({})",
                            PACKAGE_INFO_FILE, dir
                        )))
                    }
                })
                .collect();
        }

        if !source.is_dir() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in WalkDir::new(&source).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path during package discovery: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && entry.file_name() == PACKAGE_INFO_FILE {
                if let Some(parent) = entry.path().parent() {
                    dirs.push(parent.to_path_buf());
                }
            }
        }
        Ok(dirs)
    }

    /// Check every candidate package and persist the cache
    pub fn check_all(&self, options: &CheckOptions) -> Result<CheckReport> {
        let mut cache = VersionCache::load(&self.repo_root);
        let dirs = self.candidates(&options.packages)?;
        info!("Checking versions for {} packages", dirs.len());

        let mut report = CheckReport::default();
        for dir in dirs {
            let check = self.check_package(&dir, &mut cache, options)?;
            report.packages.push(check);
        }

        if let Err(e) = cache.save() {
            warn!("Could not write cached versions to file: {}", e);
        }

        report.packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(report)
    }

    fn check_package(
        &self,
        dir: &Path,
        cache: &mut VersionCache,
        options: &CheckOptions,
    ) -> Result<PackageCheck> {
        let info_path = dir.join(PACKAGE_INFO_FILE);
        let mut info = PackageInfo::from_file(&info_path)?;
        debug!("Checking version for package ({})", info.name);

        let now = now_millis();
        let mut check = PackageCheck {
            name: info.name.clone(),
            dir: dir.to_path_buf(),
            outcome: CheckOutcome::UpToDate,
            cached: false,
        };

        let cached = if options.force {
            None
        } else {
            cache.fresh(&info.name, now).map(str::to_string)
        };

        let latest = match cached {
            Some(version) => {
                check.cached = true;
                version
            }
            None => {
                let Some(script) = ScriptRunner::script_for(dir) else {
                    check.outcome = CheckOutcome::MissingScript;
                    return Ok(check);
                };

                let output = match self.runner.run(&script) {
                    Ok(output) => output,
                    Err(e) => {
                        check.outcome = CheckOutcome::ScriptError(e.to_string());
                        return Ok(check);
                    }
                };

                if output == IGNORE_SENTINEL {
                    cache.remove(&info.name);
                    check.outcome = CheckOutcome::Ignored;
                    return Ok(check);
                }

                if output.is_empty() || output == "null" {
                    check.outcome =
                        CheckOutcome::ScriptError(format!("invalid version number \"{}\"", output));
                    return Ok(check);
                }

                cache.insert(&info.name, &output, now);
                output
            }
        };

        if latest == info.version {
            return Ok(check);
        }

        check.outcome = CheckOutcome::UpdateAvailable {
            old: info.version.clone(),
            new: latest.clone(),
        };

        if options.apply {
            info.version = latest;
            info.revision = 1;
            self.apply_update(&info_path, &info);
        }

        Ok(check)
    }

    /// Rewrite `pkg.info` and regenerate the source archive; failures only warn
    fn apply_update(&self, info_path: &Path, info: &PackageInfo) {
        if let Err(e) = write_package_info(info_path, info) {
            warn!(
                "Could not write new version for package ({}) to file: {}",
                info.name, e
            );
        }

        let dir = info_path.parent().unwrap_or_else(|| Path::new("."));
        if let Err(e) = self.archiver.create_source_archive(dir) {
            warn!("Could not generate source package ({}): {}", info.name, e);
        }
    }
}

/// Replace a descriptor file, keeping its permissions
pub fn write_package_info(path: &Path, info: &PackageInfo) -> Result<()> {
    let permissions = fs::metadata(path)?.permissions();
    let data = info.to_yaml()?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data.as_bytes())?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    info!("Updated {}", path.display());
    Ok(())
}
