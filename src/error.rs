// src/error.rs

//! Error types shared across the repository tooling

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by descriptor parsing, database generation, checksum
/// resolution and version tracking
#[derive(Error, Debug)]
pub enum Error {
    /// A `pkg.info` descriptor did not match the expected schema
    #[error("Malformed package descriptor: {0}")]
    MalformedDescriptor(String),

    /// An archive could not be opened, walked, or lacks a required entry
    #[error("Failed to read archive '{}': {reason}", path.display())]
    ArchiveRead { path: PathBuf, reason: String },

    /// Two archives in one directory claim the same package name
    #[error("package ({name}) has already been added to the database ({} and {})", first.display(), second.display())]
    DuplicatePackage {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A required file or directory is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// A version-check script failed, timed out, or printed an invalid value
    #[error("{0}")]
    Script(String),

    /// Fetching download content failed
    #[error("Failed to download '{url}': {reason}")]
    Download { url: String, reason: String },

    /// A `$VARIABLE` reference in a URL or branch expression is malformed
    #[error("Failed to substitute variables in '{0}'")]
    Substitution(String),

    /// A field required for the requested operation is empty
    #[error("'{0}' field cannot be empty")]
    MissingField(&'static str),

    /// No remote reference matched a git branch expression
    #[error("No reference matching '{branch}' found in {url}")]
    RefNotFound { url: String, branch: String },

    /// A branch expression is not a valid reference pattern
    #[error("Invalid reference pattern '{pattern}': {reason}")]
    InvalidRefPattern { pattern: String, reason: String },

    /// Download `type` is neither `file` nor `git`
    #[error("unknown download type ({0})")]
    UnsupportedDownloadType(String),

    /// The version cache file could not be parsed
    #[error("Version cache is corrupt: {0}")]
    CacheCorrupt(String),

    /// A `.env` line is not a single `KEY=VALUE` pair
    #[error("invalid format in environment file at line {line}")]
    EnvFormat { line: usize },

    /// A database file could not be encoded or decoded
    #[error("Database error: {0}")]
    Database(String),

    /// `create_repository` target already exists
    #[error("Repository directory already exists: {}", .0.display())]
    RepositoryExists(PathBuf),

    /// An external collaborator (git, bpm-package) could not be run
    #[error("Command '{command}' failed: {reason}")]
    Command { command: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
