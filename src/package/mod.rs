// src/package/mod.rs

//! BPM package descriptors
//!
//! A `pkg.info` file is an indentation-based YAML document describing one
//! package (and optionally its split sub-packages). Every list field
//! defaults to an empty sequence and every scalar to an empty string, so a
//! parsed [`PackageInfo`] never carries "absent" markers. Unknown keys are
//! ignored.

pub mod checksum;
mod scalar;
mod substitute;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use checksum::{ChecksumResolver, ContentFetcher, GitRefLister, HttpFetcher, RefLister};
pub use substitute::substitute_package_vars;

/// File name of the descriptor inside a package directory or archive
pub const PACKAGE_INFO_FILE: &str = "pkg.info";

/// Checksum value meaning "do not verify this download"
pub const CHECKSUM_SKIP: &str = "skip";

fn default_revision() -> u32 {
    1
}

/// `revision:` left empty or null keeps the default
fn revision_or_default<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_revision))
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Package descriptor as stored in `pkg.info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default, deserialize_with = "scalar::string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(
        default = "default_revision",
        deserialize_with = "revision_or_default",
        skip_serializing_if = "is_zero"
    )]
    pub revision: u32,
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<String>,
    #[serde(
        rename = "architecture",
        default,
        deserialize_with = "scalar::string",
        skip_serializing_if = "String::is_empty"
    )]
    pub arch: String,
    #[serde(
        rename = "output_architecture",
        default,
        deserialize_with = "scalar::string",
        skip_serializing_if = "String::is_empty"
    )]
    pub output_arch: String,
    /// `source` or `binary`
    #[serde(
        rename = "type",
        default,
        deserialize_with = "scalar::string",
        skip_serializing_if = "String::is_empty"
    )]
    pub package_type: String,
    /// Paths preserved across upgrades
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keep: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime_depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub make_depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check_depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub downloads: Vec<PackageDownload>,
    /// Split sub-packages; they share the parent's version and revision
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub split_packages: Vec<PackageInfo>,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            version: String::new(),
            revision: default_revision(),
            url: String::new(),
            license: String::new(),
            maintainers: Vec::new(),
            arch: String::new(),
            output_arch: String::new(),
            package_type: String::new(),
            keep: Vec::new(),
            depends: Vec::new(),
            runtime_depends: Vec::new(),
            optional_depends: Vec::new(),
            make_depends: Vec::new(),
            check_depends: Vec::new(),
            conflicts: Vec::new(),
            replaces: Vec::new(),
            provides: Vec::new(),
            options: Vec::new(),
            downloads: Vec::new(),
            split_packages: Vec::new(),
        }
    }
}

impl PackageInfo {
    /// Parse a descriptor from raw `pkg.info` bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        // An empty document deserializes as unit, not as a mapping
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(data).map_err(|e| Error::MalformedDescriptor(e.to_string()))
    }

    /// Read and parse a loose descriptor file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;
        Self::parse(&data)
    }

    /// Serialize back to descriptor text
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::MalformedDescriptor(e.to_string()))
    }

    /// `version-revision`, as used in archive names and freshness comparisons
    pub fn full_version(&self) -> String {
        format!("{}-{}", self.version, self.revision)
    }

    /// Names this descriptor contributes to a repository listing: the split
    /// packages when present, otherwise the package itself
    pub fn listed_names(&self) -> Vec<&str> {
        if self.split_packages.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.split_packages.iter().map(|p| p.name.as_str()).collect()
        }
    }
}

/// How a download is acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    File,
    Git,
}

impl DownloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Git => "git",
        }
    }
}

impl fmt::Display for DownloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "file" => Ok(Self::File),
            "git" => Ok(Self::Git),
            other => Err(Error::UnsupportedDownloadType(other.to_string())),
        }
    }
}

/// One source-acquisition entry of a descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDownload {
    #[serde(default, deserialize_with = "scalar::string")]
    pub url: String,
    /// Raw `type` value; empty means `file`
    #[serde(
        rename = "type",
        default,
        deserialize_with = "scalar::string",
        skip_serializing_if = "String::is_empty"
    )]
    pub kind: String,
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub filepath: String,

    #[serde(default, deserialize_with = "scalar::or_default", skip_serializing_if = "is_false")]
    pub no_extract: bool,
    /// Extraction target; may reference the package's source directory placeholder
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub extract_to: String,
    #[serde(default, deserialize_with = "scalar::or_default", skip_serializing_if = "is_zero")]
    pub extract_strip_components: u32,

    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub clone_to: String,
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub git_branch: String,

    /// Hex SHA-256 digest, git object id, or `skip`
    #[serde(default, deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub checksum: String,
}

impl PackageDownload {
    pub fn kind(&self) -> Result<DownloadKind> {
        self.kind.parse()
    }

    /// Whether verification was explicitly disabled with `checksum: skip`
    pub fn skips_checksum(&self) -> bool {
        self.checksum == CHECKSUM_SKIP
    }
}
