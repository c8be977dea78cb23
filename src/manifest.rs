//! The persisted manifest data model.
//!
//! A manifest is a tree of [`ManifestNode`]s mirroring the filtered shape of
//! the live tree it was built from: one node per directory, holding a mapping
//! of child folders and a mapping of file records. It is persisted as a
//! single JSON document and loaded/saved as a unit, never streamed.
//!
//! `BTreeMap` keeps serialized output sorted and stable, so two manifests of
//! the same tree are byte-identical regardless of enumeration order.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// One directory's worth of manifest state.
///
/// A node has no identity beyond its position in the tree; parents exclusively
/// own their children. A name never appears in both mappings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Child directories by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub folders: BTreeMap<String, ManifestNode>,

    /// File records by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, FileRecord>,
}

impl ManifestNode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The recorded state of a single file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Hex-encoded content fingerprint. Never empty once assigned.
    pub hash: String,

    /// When set, a later content mismatch against this record is logged and
    /// accepted instead of aborting the run.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_changes: bool,
}

impl FileRecord {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            ignore_changes: false,
        }
    }
}

/// Loads a manifest document from disk.
///
/// # Errors
///
/// Returns [`SyncError::ManifestNotFound`] when no file exists at `path`,
/// [`SyncError::ManifestParse`] when it is not a valid manifest document.
pub fn load_manifest(path: &Path) -> Result<ManifestNode> {
    if !path.exists() {
        return Err(SyncError::ManifestNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| SyncError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves a manifest document to disk atomically.
///
/// Writes to a sibling temporary file first, then renames it into place, so
/// the manifest is never left half-written.
pub fn save_manifest(root: &ManifestNode, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SyncError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string(root).map_err(|source| SyncError::ManifestWrite {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = path.with_extension("tmp");

    let mut temp_file = File::create(&temp_path).map_err(|source| SyncError::Io {
        path: temp_path.clone(),
        source,
    })?;

    temp_file
        .write_all(json.as_bytes())
        .map_err(|source| SyncError::Io {
            path: temp_path.clone(),
            source,
        })?;

    temp_file.sync_all().map_err(|source| SyncError::Io {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
