use std::fs::File;
use std::path::Path;

use blake3::Hasher;
use memmap2::Mmap;

use crate::error::SyncError;

/// Computes the content fingerprint of a file: a hex-encoded BLAKE3 hash of
/// its full byte stream.
///
/// The file is memory-mapped and hashed in one pass. Symbolic links and
/// directories are rejected; a tree being synchronized is expected to consist
/// of regular files only.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the path is not a regular
/// file, or memory mapping fails.
pub fn fingerprint_file(path: &Path) -> Result<String, SyncError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_symlink() {
        return Err(SyncError::InvalidFileType {
            path: path.to_path_buf(),
            message: "symbolic links cannot be fingerprinted".to_string(),
        });
    }

    if metadata.is_dir() {
        return Err(SyncError::InvalidFileType {
            path: path.to_path_buf(),
            message: "directories cannot be fingerprinted".to_string(),
        });
    }

    // Mapping a zero-length file is platform-dependent; hash it directly.
    if metadata.len() == 0 {
        return Ok(Hasher::new().finalize().to_hex().to_string());
    }

    let file = File::open(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Hasher::new();
    hasher.update(&mmap);

    Ok(hasher.finalize().to_hex().to_string())
}
