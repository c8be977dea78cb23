//! The tree provider abstraction.
//!
//! A [`TreeProvider`] is a uniform navigation/query/mutation contract over a
//! hierarchical file tree. Three implementations exist, differing only in
//! which operations they support:
//!
//! - [`LiveTree`]: the real filesystem; all read/write/delete operations.
//! - [`ManifestTree`]: in-memory hash records with structural navigation, no
//!   raw byte I/O.
//! - [`ArchiveSink`]: a write-only zip delivery target.
//!
//! Every provider keeps a *relative path cursor* — the ordered folder names
//! from its root down to the current directory. All operations are scoped to
//! the cursor. `enter_folder`/`leave_folder` must be paired on every exit
//! path within each recursive call; the engine owns that discipline.
//!
//! Operations an implementation does not support return
//! [`SyncError::UnsupportedOperation`] through the trait's default bodies.
//! Callers select capabilities at construction time, never by runtime type
//! inspection.

use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

mod archive;
mod live;
mod manifest_tree;

pub use archive::ArchiveSink;
pub use live::LiveTree;
pub use manifest_tree::ManifestTree;

/// One directory entry as reported by [`TreeProvider::list`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_folder: bool,
}

impl Entry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_folder: false,
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_folder: true,
        }
    }
}

/// Uniform contract over a hierarchical file tree.
///
/// All operations act relative to the provider's current cursor position.
/// `list` gives no ordering guarantee; callers must not rely on enumeration
/// order for correctness.
pub trait TreeProvider {
    /// The relative path stack from the provider's root to the current
    /// directory.
    fn cursor(&self) -> &[String];

    /// Push `name` onto the cursor. Manifest-backed providers validate that
    /// the folder exists; others move blindly and surface errors on the next
    /// scoped operation.
    fn enter_folder(&mut self, name: &str) -> Result<()>;

    /// Pop the cursor back to the parent directory.
    fn leave_folder(&mut self);

    /// Enumerate the current directory. Reflects live state at call time.
    fn list(&self, want_files: bool, want_folders: bool) -> Result<Vec<Entry>>;

    /// Stored fingerprint for `name`, or `None` when no record exists.
    fn file_hash(&self, _name: &str) -> Result<Option<String>> {
        Err(SyncError::UnsupportedOperation("file_hash"))
    }

    /// Record a fingerprint for `name` (manifest-backed only).
    fn set_file_hash(&mut self, _name: &str, _hash: &str) -> Result<()> {
        Err(SyncError::UnsupportedOperation("set_file_hash"))
    }

    /// Whether content drift on `name` is tolerated.
    fn ignore_changes(&self, _name: &str) -> Result<bool> {
        Err(SyncError::UnsupportedOperation("ignore_changes"))
    }

    /// Flag `name` so content drift is logged instead of fatal
    /// (manifest-backed only).
    fn set_ignore_changes(&mut self, _name: &str, _ignore: bool) -> Result<()> {
        Err(SyncError::UnsupportedOperation("set_ignore_changes"))
    }

    /// Create a folder named `name` in the current directory.
    fn make_folder(&mut self, _name: &str) -> Result<()> {
        Err(SyncError::UnsupportedOperation("make_folder"))
    }

    /// Remove the file `name` from the current directory.
    fn delete_file(&mut self, _name: &str) -> Result<()> {
        Err(SyncError::UnsupportedOperation("delete_file"))
    }

    /// Recursively remove the folder `name` from the current directory.
    fn delete_folder(&mut self, _name: &str) -> Result<()> {
        Err(SyncError::UnsupportedOperation("delete_folder"))
    }

    /// Copy the bytes of a local file into the provider at `dest`, a path
    /// relative to the provider's root.
    fn put_file(&mut self, _local: &Path, _dest: &Path) -> Result<()> {
        Err(SyncError::UnsupportedOperation("put_file"))
    }

    /// Absolute local path of `name`, for providers backed by real storage.
    fn local_path(&self, _name: &str) -> Result<PathBuf> {
        Err(SyncError::UnsupportedOperation("local_path"))
    }

    /// Compute the content fingerprint of `name` by reading its full byte
    /// stream.
    fn compute_hash(&self, _name: &str) -> Result<String> {
        Err(SyncError::UnsupportedOperation("compute_hash"))
    }
}
