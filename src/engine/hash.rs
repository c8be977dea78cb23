//! The hash algorithm: fingerprint a source tree into a manifest.

use crate::error::Result;
use crate::filter::{FileDisposition, FilterSet};
use crate::logging::Logger;
use crate::provider::TreeProvider;

/// Builds a content-hash manifest of `src` into `dst`.
///
/// Both providers start with synchronized cursors (normally both at their
/// roots). For every filter-included file the fingerprint is computed and
/// recorded; ignore-if-missing files additionally get their `ignore_changes`
/// flag set. Included folders are created in `dst` when absent, then both
/// cursors descend together. Destination folders with no counterpart in the
/// filtered source are left untouched — this pass never deletes.
///
/// # Errors
///
/// Any I/O failure while fingerprinting aborts the whole run with the failing
/// path in the error; nothing is committed by this function itself.
pub fn build_manifest<S, D>(
    src: &mut S,
    dst: &mut D,
    filters: &FilterSet,
    log: &Logger,
) -> Result<()>
where
    S: TreeProvider,
    D: TreeProvider,
{
    let mut folders = Vec::new();

    for entry in src.list(true, true)? {
        if entry.is_folder {
            if filters.folder_included(src.cursor(), &entry.name) {
                folders.push(entry.name);
            }
            continue;
        }

        let disposition = filters.file_disposition(src.cursor(), &entry.name);
        if disposition == FileDisposition::AlwaysIgnore {
            continue;
        }

        let hash = src.compute_hash(&entry.name)?;
        dst.set_file_hash(&entry.name, &hash)?;
        if disposition == FileDisposition::IgnoreIfMissing {
            dst.set_ignore_changes(&entry.name, true)?;
        }
        log.verbose(
            2,
            format!(
                "Hashed: {}",
                crate::filter::relative_path(src.cursor(), &entry.name).display()
            ),
        );
    }

    let existing: std::collections::HashSet<String> = dst
        .list(false, true)?
        .into_iter()
        .map(|entry| entry.name)
        .collect();

    for name in folders {
        if !existing.contains(&name) {
            dst.make_folder(&name)?;
        }

        src.enter_folder(&name)?;
        if let Err(err) = dst.enter_folder(&name) {
            src.leave_folder();
            return Err(err);
        }

        let nested = build_manifest(src, dst, filters, log);

        dst.leave_folder();
        src.leave_folder();
        nested?;
    }

    Ok(())
}
