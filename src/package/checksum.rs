// src/package/checksum.rs

//! Checksum resolution for descriptor downloads
//!
//! - `file` downloads: the URL (after variable substitution) is fetched and
//!   its content hashed with SHA-256.
//! - `git` downloads: the remote's branches and tags are listed and the
//!   object id of the last reference matching `git_branch` is used.
//!
//! Network and git access sit behind [`ContentFetcher`] and [`RefLister`]
//! so the resolution rules can be exercised without either.

use super::substitute::substitute_package_vars;
use super::{DownloadKind, PackageDownload, PackageInfo};
use crate::error::{Error, Result};
use crate::hash;
use regex::Regex;
use reqwest::blocking::Client;
use std::io::Read;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Fetches the byte content of a URL
pub trait ContentFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// Lists remote references of a git repository
///
/// Output follows `git ls-remote`: one `<object-id>\t<ref-name>` per line.
pub trait RefLister {
    fn list_refs(&self, url: &str) -> Result<String>;
}

/// [`ContentFetcher`] backed by a blocking HTTP client that follows redirects
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build().map_err(|e| Error::Download {
            url: String::new(),
            reason: format!("Failed to create HTTP client: {e}"),
        })?;
        Ok(Self { client })
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>> {
        let response = self.client.get(url).send().map_err(|e| Error::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        Ok(Box::new(response))
    }
}

/// [`RefLister`] running `git ls-remote --branches --tags`
#[derive(Debug, Default)]
pub struct GitRefLister;

impl RefLister for GitRefLister {
    fn list_refs(&self, url: &str) -> Result<String> {
        let output = Command::new("git")
            .args(["ls-remote", "-b", "-t", url])
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| Error::Command {
                command: "git ls-remote".to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Command {
                command: "git ls-remote".to_string(),
                reason: format!("exited with {}", output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Resolves the checksum a download entry should carry
pub struct ChecksumResolver {
    fetcher: Box<dyn ContentFetcher>,
    lister: Box<dyn RefLister>,
}

impl ChecksumResolver {
    /// Resolver using HTTP for files and the `git` binary for references
    pub fn new() -> Result<Self> {
        Ok(Self::with_backends(
            Box::new(HttpFetcher::new()?),
            Box::new(GitRefLister),
        ))
    }

    pub fn with_backends(fetcher: Box<dyn ContentFetcher>, lister: Box<dyn RefLister>) -> Self {
        Self { fetcher, lister }
    }

    /// Compute the checksum for `download`, substituting variables from `owner`
    pub fn resolve(&self, download: &PackageDownload, owner: &PackageInfo) -> Result<String> {
        let kind = download.kind()?;
        debug!("Resolving {} download {}", kind, download.url);
        match kind {
            DownloadKind::File => self.resolve_file(download, owner),
            DownloadKind::Git => self.resolve_git(download, owner),
        }
    }

    /// Resolve every download of `owner` whose checksum is not `skip`,
    /// returning `(index, checksum)` pairs in download order
    pub fn resolve_all(&self, owner: &PackageInfo) -> Result<Vec<(usize, String)>> {
        owner
            .downloads
            .iter()
            .enumerate()
            .filter(|(_, download)| !download.skips_checksum())
            .map(|(index, download)| Ok((index, self.resolve(download, owner)?)))
            .collect()
    }

    fn resolve_file(&self, download: &PackageDownload, owner: &PackageInfo) -> Result<String> {
        let url = substitute_package_vars(&download.url, owner)?;
        info!("Downloading and calculating checksum for file {}", url);

        let reader = self.fetcher.fetch(&url)?;
        let (checksum, size) = hash::sha256_reader(reader).map_err(|e| Error::Download {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        debug!("Hashed {} bytes from {}", size, url);
        Ok(checksum)
    }

    fn resolve_git(&self, download: &PackageDownload, owner: &PackageInfo) -> Result<String> {
        let branch = substitute_package_vars(&download.git_branch, owner)?;
        if branch.is_empty() {
            return Err(Error::MissingField("git_branch"));
        }
        info!("Calculating checksum for git branch {} of {}", branch, download.url);

        let listing = self.lister.list_refs(&download.url)?;
        select_ref(&listing, &branch)?.ok_or_else(|| Error::RefNotFound {
            url: download.url.clone(),
            branch,
        })
    }
}

/// Pick the object id of the last reference named `refs/<kind>/<branch>`,
/// optionally followed by the peeled-tag suffix `^{}`
fn select_ref(listing: &str, branch: &str) -> Result<Option<String>> {
    let pattern = format!(r"^refs/.*/(?:{branch})(\^\{{\}})?$");
    let regex = Regex::new(&pattern).map_err(|e| Error::InvalidRefPattern {
        pattern: branch.to_string(),
        reason: e.to_string(),
    })?;

    Ok(listing
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let object_id = fields.next()?;
            let ref_name = fields.next()?;
            regex.is_match(ref_name).then_some(object_id)
        })
        .last()
        .map(str::to_string))
}
