//! Command-line interface definitions for stevedore.
//!
//! The CLI structure is defined with clap derive. [`Cli`] is the top-level
//! entry point, carrying global output options and the subcommand to run.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Main command-line interface for stevedore.
#[derive(Parser)]
#[command(
    name = "stevedore",
    author,
    version,
    about = "Detect and package directory-tree changes against a recorded manifest",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command
    pub fn command(&self) -> &Commands {
        &self.command
    }
}

/// Output options shared by all subcommands.
#[derive(Parser)]
pub struct GlobalOpts {
    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = "STEVEDORE_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "STEVEDORE_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Available stevedore subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a content-hash manifest of a tree
    ///
    /// Walks the folder depth-first, fingerprints every filter-included
    /// file, and writes the manifest to `.hashes.json` at the tree root.
    /// User filter rules are read from `sync_filters.json` when present.
    Hash {
        /// Root of the tree to fingerprint
        folder: PathBuf,

        /// Skip loading user filter rules; apply only the default policy
        #[arg(long)]
        no_filters: bool,
    },

    /// Verify a tree against its recorded manifest
    ///
    /// Pure check: the first missing, redundant, or content-drifted entry
    /// aborts the run with a non-zero exit. Nothing is modified.
    Verify {
        /// Root of the tree to verify
        folder: PathBuf,
    },

    /// Reconcile a tree to match its recorded manifest
    ///
    /// Like verify, but deletes unexpected files and folders and creates
    /// expected folders that are missing. Used after unpacking a delta
    /// archive so the target converges to the delivered state.
    Finalize {
        /// Root of the tree to reconcile
        folder: PathBuf,
    },

    /// Package changed files into a delivery archive
    ///
    /// Compares the tree against a baseline manifest, writes new and
    /// changed files into a zip archive, and refreshes `.hashes.json` as
    /// the baseline for the next cycle. The new manifest is appended to
    /// the archive as its final entry. Exits non-zero when nothing
    /// changed.
    Delta {
        /// Root of the tree to package
        folder: PathBuf,

        /// Path of the zip archive to write
        archive: PathBuf,

        /// Baseline manifest from the previous cycle; omit to treat every
        /// file as new
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Trust fingerprints from the stored `.hashes.json` instead of
        /// recomputing them
        #[arg(long, env = "STEVEDORE_REUSE_STORED_HASHES")]
        reuse_stored_hashes: bool,
    },
}
