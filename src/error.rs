//! Error types for stevedore.
//!
//! All fallible operations in the crate return [`Result`], built on a single
//! [`SyncError`] enum. Errors are strongly typed with `thiserror` and carry
//! `miette` diagnostic codes and help text for CLI output.
//!
//! Every error is fatal: a run either completes or aborts at the first
//! failure. The offending relative path is embedded in the variant wherever
//! one exists, so the top-level report names exactly what went wrong. The one
//! condition that is *not* an error is a content mismatch on a record flagged
//! `ignore_changes` — the engine downgrades that to a log line.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur during manifest, verify, and delta runs.
#[derive(Error, Debug, Diagnostic)]
pub enum SyncError {
    /// A file recorded in the manifest is missing from the target tree.
    #[error("Expected file not found: '{0}'")]
    #[diagnostic(
        code(stevedore::verify::file_not_found),
        help(
            "The file was present when the manifest was built. Restore it or rebuild the \
             manifest."
        )
    )]
    FileNotFound(
        /// Relative path of the missing file
        PathBuf,
    ),

    /// A folder recorded in the manifest is missing from the target tree.
    #[error("Expected folder not found: '{0}'")]
    #[diagnostic(
        code(stevedore::verify::folder_not_found),
        help("Run 'stevedore finalize' to create missing folders during reconciliation.")
    )]
    FolderNotFound(
        /// Relative path of the missing folder
        PathBuf,
    ),

    /// The target tree contains a file the manifest knows nothing about.
    #[error("Redundant file: '{0}'")]
    #[diagnostic(
        code(stevedore::verify::redundant_file),
        help("Run 'stevedore finalize' to delete unexpected entries during reconciliation.")
    )]
    RedundantFile(
        /// Relative path of the unexpected file
        PathBuf,
    ),

    /// The target tree contains a folder the manifest knows nothing about.
    #[error("Redundant folder: '{0}'")]
    #[diagnostic(
        code(stevedore::verify::redundant_folder),
        help("Run 'stevedore finalize' to delete unexpected entries during reconciliation.")
    )]
    RedundantFolder(
        /// Relative path of the unexpected folder
        PathBuf,
    ),

    /// A file's content fingerprint differs from the recorded one.
    ///
    /// Only raised for records whose `ignore_changes` flag is unset; flagged
    /// records log the drift and continue.
    #[error("Content hash differs for '{0}'")]
    #[diagnostic(
        code(stevedore::verify::hash_mismatch),
        help(
            "The file changed since the manifest was built. Rebuild the manifest, or mark the \
             file ignore-if-missing in the filter rules if drift is expected."
        )
    )]
    HashMismatch(
        /// Relative path of the drifted file
        PathBuf,
    ),

    /// A stored fingerprint required by `--reuse-stored-hashes` is absent.
    ///
    /// The reuse mode trusts the previously persisted manifest for the
    /// current tree's fingerprints; a missing record means that manifest is
    /// stale and packaging would ship unverified content.
    #[error("Stored hash not found for '{0}'")]
    #[diagnostic(
        code(stevedore::delta::hash_not_found),
        help("Run 'stevedore hash' to refresh the stored manifest, or drop --reuse-stored-hashes.")
    )]
    HashNotFound(
        /// Relative path of the record that was expected
        PathBuf,
    ),

    /// File system I/O failure during any operation.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(stevedore::io_error))]
    Io {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Attempted to fingerprint a non-regular file (symlink or directory).
    #[error("Invalid file type for '{path}': {message}")]
    #[diagnostic(
        code(stevedore::file::invalid_type),
        help("Only regular files participate in hashing and delivery.")
    )]
    InvalidFileType {
        /// The path of the invalid file
        path: PathBuf,
        /// Description of the file type issue
        message: String,
    },

    /// The filter rules file exists but could not be loaded.
    #[error("Failed to load filter rules from '{path}': {message}")]
    #[diagnostic(
        code(stevedore::filter::rules_error),
        help("Fix or remove the rules file; the default filter policy applies when it is absent.")
    )]
    FilterRules {
        /// Path of the rules file
        path: PathBuf,
        /// Description of the load failure
        message: String,
    },

    /// No manifest exists where one is required.
    #[error("Manifest not found at '{0}'")]
    #[diagnostic(
        code(stevedore::manifest::not_found),
        help("Run 'stevedore hash <folder>' to build one first.")
    )]
    ManifestNotFound(
        /// Expected location of the manifest
        PathBuf,
    ),

    /// The manifest file exists but is not a valid manifest document.
    #[error("Failed to parse manifest '{path}'")]
    #[diagnostic(
        code(stevedore::manifest::parse_error),
        help("The manifest may be corrupted. Rebuild it with 'stevedore hash'.")
    )]
    ManifestParse {
        /// Path of the unreadable manifest
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the manifest for persistence failed.
    #[error("Failed to write manifest '{path}'")]
    #[diagnostic(code(stevedore::manifest::write_error))]
    ManifestWrite {
        /// Destination path of the manifest
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The delivery archive could not be written or finalized.
    #[error("Archive error for '{path}'")]
    #[diagnostic(code(stevedore::archive::write_error))]
    Archive {
        /// Path of the archive being written
        path: PathBuf,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// An operation was invoked on a provider that does not support it.
    ///
    /// Providers differ only in which operations they support; hitting this
    /// means an algorithm asked a provider for a capability it was never
    /// constructed with.
    #[error("Operation '{0}' is not supported by this tree provider")]
    #[diagnostic(code(stevedore::provider::unsupported))]
    UnsupportedOperation(
        /// Name of the unsupported operation
        &'static str,
    ),

    /// A delta run found nothing to deliver.
    #[error("No changed files: the delta archive is empty")]
    #[diagnostic(
        code(stevedore::delta::empty),
        help("The tree matches the baseline manifest; there is nothing to ship.")
    )]
    EmptyDelta,
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SyncError>;
