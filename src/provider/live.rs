//! Tree provider backed by the real filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::hashing::fingerprint_file;
use crate::provider::{Entry, TreeProvider};

/// A live directory tree rooted at a local path.
///
/// Supports the full provider contract: enumeration, fingerprinting, folder
/// creation, deletion, and byte copies into the tree.
#[derive(Debug)]
pub struct LiveTree {
    root: PathBuf,
    cursor: Vec<String>,
}

impl LiveTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cursor: Vec::new(),
        }
    }

    /// Absolute path of the current directory.
    fn current_dir(&self) -> PathBuf {
        let mut path = self.root.clone();
        for part in &self.cursor {
            path.push(part);
        }
        path
    }

    fn child_path(&self, name: &str) -> PathBuf {
        self.current_dir().join(name)
    }
}

impl TreeProvider for LiveTree {
    fn cursor(&self) -> &[String] {
        &self.cursor
    }

    fn enter_folder(&mut self, name: &str) -> Result<()> {
        self.cursor.push(name.to_string());
        Ok(())
    }

    fn leave_folder(&mut self) {
        self.cursor.pop();
    }

    fn list(&self, want_files: bool, want_folders: bool) -> Result<Vec<Entry>> {
        let dir = self.current_dir();
        let read_dir = fs::read_dir(&dir).map_err(|source| SyncError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|source| SyncError::Io {
                path: dir.clone(),
                source,
            })?;
            let file_type = dir_entry.file_type().map_err(|source| SyncError::Io {
                path: dir_entry.path(),
                source,
            })?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                if want_folders {
                    entries.push(Entry::folder(name));
                }
            } else if want_files {
                entries.push(Entry::file(name));
            }
        }
        Ok(entries)
    }

    fn make_folder(&mut self, name: &str) -> Result<()> {
        let path = self.child_path(name);
        fs::create_dir(&path).map_err(|source| SyncError::Io { path, source })
    }

    fn delete_file(&mut self, name: &str) -> Result<()> {
        let path = self.child_path(name);
        fs::remove_file(&path).map_err(|source| SyncError::Io { path, source })
    }

    fn delete_folder(&mut self, name: &str) -> Result<()> {
        let path = self.child_path(name);
        fs::remove_dir_all(&path).map_err(|source| SyncError::Io { path, source })
    }

    fn put_file(&mut self, local: &Path, dest: &Path) -> Result<()> {
        let target = self.root.join(dest);
        fs::copy(local, &target)
            .map(|_| ())
            .map_err(|source| SyncError::Io {
                path: target,
                source,
            })
    }

    fn local_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.child_path(name))
    }

    fn compute_hash(&self, name: &str) -> Result<String> {
        fingerprint_file(&self.child_path(name))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn tree_with(entries: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for (path, content) in entries {
            let full = temp_dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        temp_dir
    }

    #[test]
    fn lists_files_and_folders_separately() {
        let temp_dir = tree_with(&[("a.txt", "x"), ("sub/b.txt", "y")]);
        let tree = LiveTree::new(temp_dir.path());

        let files = tree.list(true, false).unwrap();
        assert_eq!(files, vec![Entry::file("a.txt")]);

        let folders = tree.list(false, true).unwrap();
        assert_eq!(folders, vec![Entry::folder("sub")]);
    }

    #[test]
    fn cursor_scopes_operations() {
        let temp_dir = tree_with(&[("sub/b.txt", "y")]);
        let mut tree = LiveTree::new(temp_dir.path());

        tree.enter_folder("sub").unwrap();
        assert_eq!(tree.cursor(), ["sub"]);
        let files = tree.list(true, false).unwrap();
        assert_eq!(files, vec![Entry::file("b.txt")]);

        tree.leave_folder();
        assert!(tree.cursor().is_empty());
    }

    #[test]
    fn computes_hash_of_child() {
        let temp_dir = tree_with(&[("a.txt", "hello world")]);
        let tree = LiveTree::new(temp_dir.path());
        assert_eq!(
            tree.compute_hash("a.txt").unwrap(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn deletes_files_and_folders() {
        let temp_dir = tree_with(&[("a.txt", "x"), ("sub/nested/b.txt", "y")]);
        let mut tree = LiveTree::new(temp_dir.path());

        tree.delete_file("a.txt").unwrap();
        assert!(!temp_dir.path().join("a.txt").exists());

        tree.delete_folder("sub").unwrap();
        assert!(!temp_dir.path().join("sub").exists());
    }

    #[test]
    fn makes_folder_and_puts_file() {
        let src_dir = tree_with(&[("payload.txt", "data")]);
        let dst_dir = TempDir::new().unwrap();
        let mut tree = LiveTree::new(dst_dir.path());

        tree.make_folder("out").unwrap();
        tree.put_file(
            &src_dir.path().join("payload.txt"),
            Path::new("out/payload.txt"),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(dst_dir.path().join("out/payload.txt")).unwrap(),
            "data"
        );
    }

    #[test]
    fn listing_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut tree = LiveTree::new(temp_dir.path());
        tree.enter_folder("absent").unwrap();
        assert!(matches!(tree.list(true, true), Err(SyncError::Io { .. })));
    }

    #[test]
    fn hash_storage_is_unsupported() {
        let temp_dir = TempDir::new().unwrap();
        let mut tree = LiveTree::new(temp_dir.path());
        assert!(matches!(
            tree.set_file_hash("a", "00"),
            Err(SyncError::UnsupportedOperation("set_file_hash"))
        ));
    }
}
