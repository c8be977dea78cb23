//! Tree provider backed by an in-memory manifest.

use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::manifest::{FileRecord, ManifestNode, load_manifest, save_manifest};
use crate::provider::{Entry, TreeProvider};

/// A manifest held in memory, navigable like a directory tree.
///
/// Supports structural navigation and fingerprint/ignore-flag storage; no raw
/// byte I/O. Created empty, populated top-down by the hash and delta
/// algorithms, or loaded from a persisted document.
#[derive(Debug, Default)]
pub struct ManifestTree {
    root: ManifestNode,
    cursor: Vec<String>,
}

impl ManifestTree {
    /// An empty manifest positioned at its root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a persisted manifest document.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            root: load_manifest(path)?,
            cursor: Vec::new(),
        })
    }

    /// Persist the whole tree as a single document.
    pub fn save(&self, path: &Path) -> Result<()> {
        save_manifest(&self.root, path)
    }

    fn cursor_path(&self) -> PathBuf {
        self.cursor.iter().collect()
    }

    fn node(&self) -> Result<&ManifestNode> {
        let mut node = &self.root;
        for part in &self.cursor {
            node = node
                .folders
                .get(part)
                .ok_or_else(|| SyncError::FolderNotFound(self.cursor_path()))?;
        }
        Ok(node)
    }

    fn node_mut(&mut self) -> Result<&mut ManifestNode> {
        let cursor_path = self.cursor_path();
        let mut node = &mut self.root;
        for part in &self.cursor {
            node = node
                .folders
                .get_mut(part)
                .ok_or_else(|| SyncError::FolderNotFound(cursor_path.clone()))?;
        }
        Ok(node)
    }

    fn record_mut(&mut self, name: &str) -> Result<&mut FileRecord> {
        let missing = self.cursor_path().join(name);
        self.node_mut()?
            .files
            .get_mut(name)
            .ok_or(SyncError::HashNotFound(missing))
    }
}

impl TreeProvider for ManifestTree {
    fn cursor(&self) -> &[String] {
        &self.cursor
    }

    fn enter_folder(&mut self, name: &str) -> Result<()> {
        if !self.node()?.folders.contains_key(name) {
            return Err(SyncError::FolderNotFound(self.cursor_path().join(name)));
        }
        self.cursor.push(name.to_string());
        Ok(())
    }

    fn leave_folder(&mut self) {
        self.cursor.pop();
    }

    fn list(&self, want_files: bool, want_folders: bool) -> Result<Vec<Entry>> {
        let node = self.node()?;
        let mut entries = Vec::new();
        if want_folders {
            entries.extend(node.folders.keys().map(Entry::folder));
        }
        if want_files {
            entries.extend(node.files.keys().map(Entry::file));
        }
        Ok(entries)
    }

    fn file_hash(&self, name: &str) -> Result<Option<String>> {
        Ok(self.node()?.files.get(name).map(|r| r.hash.clone()))
    }

    fn set_file_hash(&mut self, name: &str, hash: &str) -> Result<()> {
        let node = self.node_mut()?;
        match node.files.get_mut(name) {
            Some(record) => record.hash = hash.to_string(),
            None => {
                node.files.insert(name.to_string(), FileRecord::new(hash));
            }
        }
        Ok(())
    }

    fn ignore_changes(&self, name: &str) -> Result<bool> {
        Ok(self
            .node()?
            .files
            .get(name)
            .is_some_and(|r| r.ignore_changes))
    }

    fn set_ignore_changes(&mut self, name: &str, ignore: bool) -> Result<()> {
        self.record_mut(name)?.ignore_changes = ignore;
        Ok(())
    }

    fn make_folder(&mut self, name: &str) -> Result<()> {
        self.node_mut()?.folders.entry(name.to_string()).or_default();
        Ok(())
    }

    fn delete_file(&mut self, name: &str) -> Result<()> {
        self.node_mut()?.files.remove(name);
        Ok(())
    }

    fn delete_folder(&mut self, name: &str) -> Result<()> {
        self.node_mut()?.folders.remove(name);
        Ok(())
    }
}
