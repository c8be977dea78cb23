//! # stevedore
//!
//! Detects and packages changes in a directory tree against a previously
//! recorded snapshot, so a large file tree can be updated incrementally
//! instead of copied wholesale.
//!
//! ## Overview
//!
//! A *manifest* records one BLAKE3 content fingerprint per file, mirroring
//! the filtered shape of a tree. Three operations are built on it:
//!
//! - **hash**: walk a tree and write its manifest
//! - **verify**/**finalize**: check a tree against a manifest, optionally
//!   reconciling drift (delete unexpected entries, create missing folders)
//! - **delta**: compare a tree against a baseline manifest, package new and
//!   changed files into a zip archive, and emit the next cycle's manifest
//!
//! ## Architecture
//!
//! - [`cli`]: command-line definitions using clap
//! - [`commands`]: wiring of providers, engine, and persistence per verb
//! - [`engine`]: the three recursive reconciliation algorithms
//! - [`provider`]: the tree-provider contract and its three implementations
//!   (live filesystem, in-memory manifest, write-only archive)
//! - [`manifest`]: the persisted manifest data model
//! - [`filter`]: default and user-supplied filter predicates
//! - [`error`]: error types with thiserror + miette
//!
//! Internal modules: `hashing` (BLAKE3 file fingerprinting).
//!
//! ## Usage
//!
//! ```bash
//! stevedore hash ./deploy
//! stevedore verify ./deploy
//! stevedore delta ./deploy update.zip --baseline prev-hashes.json
//! ```
//!
//! Traversal is single-threaded, depth-first, and fail-fast: a run either
//! completes or aborts at the first fatal mismatch or I/O failure, naming the
//! offending path.
//!
//! ## Library usage
//!
//! The command functions are exposed for programmatic use:
//!
//! ```no_run
//! use stevedore::commands;
//! use stevedore::logging::Logger;
//!
//! let log = Logger::new(0, false);
//! commands::hash(std::path::Path::new("./deploy"), true, &log)?;
//! # Ok::<(), stevedore::error::SyncError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod filter;
pub mod logging;
pub mod manifest;
pub mod provider;

// Internal modules
mod hashing;
