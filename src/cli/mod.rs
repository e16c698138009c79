// src/cli/mod.rs
//! CLI definitions for `bpm-repo`
//!
//! The command implementations live in the `commands` module. Every
//! subcommand except `create-repo` operates on the repository enclosing
//! the current working directory.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bpm-repo")]
#[command(author = "BPM Utils Contributors")]
#[command(version)]
#[command(about = "Manage BPM repositories and databases", long_about = None)]
pub struct Cli {
    /// Show informational log output
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new BPM repository
    #[command(visible_alias = "c")]
    CreateRepo {
        /// Repository name (also the directory created)
        #[arg(long)]
        name: String,

        /// Repository description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Update source and binary databases in the current repository
    #[command(visible_alias = "u")]
    UpdateDb,

    /// List packages and the state of their binary archives
    #[command(visible_alias = "l")]
    List,

    /// Check packages for newer upstream versions
    #[command(visible_alias = "v")]
    CheckVersions {
        /// Show ignored packages and packages without a check script
        #[arg(short = 'v', long)]
        show_skipped: bool,

        /// Bypass the version cache
        #[arg(short, long)]
        force: bool,

        /// Apply new versions to packages
        #[arg(short, long)]
        apply: bool,

        /// Package directories under source/ to check (default: all)
        packages: Vec<String>,
    },

    /// Resolve download checksums for a package directory
    Checksums {
        /// Package directory containing pkg.info
        directory: PathBuf,

        /// Store resolved checksums in pkg.info
        #[arg(long)]
        write: bool,
    },
}
