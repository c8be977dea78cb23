//! Write-only tree provider producing the delivery archive.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Result, SyncError};
use crate::provider::{Entry, TreeProvider};

/// A zip container being written incrementally, one file at a time.
///
/// Supports only `put_file`, `make_folder`, and cursor navigation; no
/// read-back, no deletes. [`ArchiveSink::close`] finalizes the container and
/// must be called exactly once per run, including on failure paths.
pub struct ArchiveSink {
    zip: ZipWriter<File>,
    path: PathBuf,
    cursor: Vec<String>,
    options: SimpleFileOptions,
    file_count: usize,
}

impl ArchiveSink {
    /// Create a fresh archive at `path`, truncating any existing file.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|source| SyncError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            zip: ZipWriter::new(file),
            path,
            cursor: Vec::new(),
            options: SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated),
            file_count: 0,
        })
    }

    /// Number of files written so far. The appended manifest is counted like
    /// any other entry, so callers take the count before appending it.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Finalize the container, writing the central directory.
    pub fn close(mut self) -> Result<()> {
        self.zip.finish().map_err(|source| SyncError::Archive {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Zip entry names always use forward slashes.
    fn entry_name(dest: &Path) -> String {
        dest.iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl TreeProvider for ArchiveSink {
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

    fn list(&self, _want_files: bool, _want_folders: bool) -> Result<Vec<Entry>> {
        Err(SyncError::UnsupportedOperation("list"))
    }

    fn make_folder(&mut self, name: &str) -> Result<()> {
        let mut dir: PathBuf = self.cursor.iter().collect();
        dir.push(name);
        self.zip
            .add_directory(Self::entry_name(&dir), self.options)
            .map_err(|source| SyncError::Archive {
                path: self.path.clone(),
                source,
            })
    }

    fn put_file(&mut self, local: &Path, dest: &Path) -> Result<()> {
        let mut source_file = File::open(local).map_err(|source| SyncError::Io {
            path: local.to_path_buf(),
            source,
        })?;

        self.zip
            .start_file(Self::entry_name(dest), self.options)
            .map_err(|source| SyncError::Archive {
                path: self.path.clone(),
                source,
            })?;

        io::copy(&mut source_file, &mut self.zip).map_err(|source| SyncError::Io {
            path: local.to_path_buf(),
            source,
        })?;

        self.file_count += 1;
        Ok(())
    }
}
