//! The delta algorithm: package changed files against a baseline manifest.

use std::collections::HashSet;

use crate::error::{Result, SyncError};
use crate::filter::{FileDisposition, FilterSet, relative_path};
use crate::logging::Logger;
use crate::provider::TreeProvider;

/// Mode flags for [`extract_delta`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DeltaOptions {
    /// Read the current tree's fingerprints from the previously persisted
    /// output manifest instead of recomputing them. A missing record is a
    /// fatal precondition failure, never a silent inclusion.
    pub reuse_stored_hashes: bool,
}

/// Packages the files of `src` that are new or changed relative to
/// `baseline` into `sink`, recording every included file into `output` —
/// the manifest for the next cycle.
///
/// An empty `baseline` (no prior snapshot) makes every filter-included file
/// new. Baseline-only entries are never inspected: a folder present in the
/// baseline but gone from the source is simply omitted from the output.
/// Ignore-exempt files always land in `output`, but their content drift is
/// logged and excluded from the package.
pub fn extract_delta<S, B, A, O>(
    src: &mut S,
    baseline: &mut B,
    sink: &mut A,
    output: &mut O,
    filters: &FilterSet,
    options: &DeltaOptions,
    log: &Logger,
) -> Result<()>
where
    S: TreeProvider,
    B: TreeProvider,
    A: TreeProvider,
    O: TreeProvider,
{
    walk(src, baseline, sink, output, filters, options, true, log)
}

/// One directory level. `has_baseline` is false inside subtrees the baseline
/// does not have — everything there is necessarily new and the baseline
/// cursor is left where it is.
#[allow(clippy::too_many_arguments)]
fn walk<S, B, A, O>(
    src: &mut S,
    baseline: &mut B,
    sink: &mut A,
    output: &mut O,
    filters: &FilterSet,
    options: &DeltaOptions,
    has_baseline: bool,
    log: &Logger,
) -> Result<()>
where
    S: TreeProvider,
    B: TreeProvider,
    A: TreeProvider,
    O: TreeProvider,
{
    let baseline_files: HashSet<String> = if has_baseline {
        baseline
            .list(true, false)?
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    } else {
        HashSet::new()
    };

    let mut folders = Vec::new();

    for entry in src.list(true, true)? {
        if entry.is_folder {
            if filters.folder_included(src.cursor(), &entry.name) {
                folders.push(entry.name);
            }
            continue;
        }

        let name = entry.name;
        let disposition = filters.file_disposition(src.cursor(), &name);
        if disposition == FileDisposition::AlwaysIgnore {
            continue;
        }

        let rel = relative_path(src.cursor(), &name);

        let current_hash = if options.reuse_stored_hashes {
            output
                .file_hash(&name)?
                .ok_or_else(|| SyncError::HashNotFound(rel.clone()))?
        } else {
            let hash = src.compute_hash(&name)?;
            output.set_file_hash(&name, &hash)?;
            hash
        };

        if disposition == FileDisposition::IgnoreIfMissing {
            output.set_ignore_changes(&name, true)?;
        }

        let mut include = !baseline_files.contains(&name);
        if !include && baseline.file_hash(&name)?.as_deref() != Some(current_hash.as_str()) {
            if disposition == FileDisposition::IgnoreIfMissing {
                log.info(format!("Change ignored: {}", rel.display()));
            } else {
                include = true;
            }
        }

        if include {
            log.verbose(1, format!("Adding: {}", rel.display()));
            let local = src.local_path(&name)?;
            sink.put_file(&local, &rel)?;
        }
    }

    let baseline_folders: HashSet<String> = if has_baseline {
        baseline
            .list(false, true)?
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    } else {
        HashSet::new()
    };

    for name in folders {
        sink.make_folder(&name)?;
        // Non-destructive: a loaded output manifest keeps its subtree.
        output.make_folder(&name)?;

        src.enter_folder(&name)?;
        if let Err(err) = sink.enter_folder(&name) {
            src.leave_folder();
            return Err(err);
        }
        if let Err(err) = output.enter_folder(&name) {
            sink.leave_folder();
            src.leave_folder();
            return Err(err);
        }

        let nested = if has_baseline && baseline_folders.contains(&name) {
            match baseline.enter_folder(&name) {
                Ok(()) => {
                    let result =
                        walk(src, baseline, sink, output, filters, options, true, log);
                    baseline.leave_folder();
                    result
                }
                Err(err) => Err(err),
            }
        } else {
            walk(src, baseline, sink, output, filters, options, false, log)
        };

        output.leave_folder();
        sink.leave_folder();
        src.leave_folder();
        nested?;
    }

    Ok(())
}
