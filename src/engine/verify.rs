//! The verify algorithm: reconcile a live tree against a manifest.

use std::collections::HashSet;

use crate::error::{Result, SyncError};
use crate::filter::{FileDisposition, FilterSet, relative_path};
use crate::logging::Logger;
use crate::provider::TreeProvider;

/// Reconciliation flags for [`verify`].
///
/// The defaults (`delete` and `create_missing_folders` both off) make verify
/// a pure check; the finalize mode turns both on so the target converges to
/// the manifest's shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct VerifyOptions {
    /// Remove unexpected files and folders instead of failing on them.
    pub delete: bool,
    /// Create expected folders missing from the target instead of failing.
    pub create_missing_folders: bool,
}

/// Verifies that `actual` matches the state recorded in `expected`.
///
/// Fail-fast: the first structural or content mismatch aborts the whole
/// traversal with the offending relative path. The only tolerated drift is a
/// content mismatch on a record flagged `ignore_changes`, which is logged and
/// accepted. Files matched by an always-ignore filter are invisible: present
/// or absent, they are never flagged.
pub fn verify<E, A>(
    expected: &mut E,
    actual: &mut A,
    filters: &FilterSet,
    options: &VerifyOptions,
    log: &Logger,
) -> Result<()>
where
    E: TreeProvider,
    A: TreeProvider,
{
    let mut actual_files: HashSet<String> = actual
        .list(true, false)?
        .into_iter()
        .map(|entry| entry.name)
        .collect();

    let mut folders = Vec::new();

    for entry in expected.list(true, true)? {
        if entry.is_folder {
            if filters.folder_included(expected.cursor(), &entry.name) {
                folders.push(entry.name);
            }
            continue;
        }

        let name = entry.name;
        let disposition = filters.file_disposition(expected.cursor(), &name);
        if disposition == FileDisposition::AlwaysIgnore {
            // An ignored file that somehow has a manifest record is dropped
            // from the working set without comparison.
            actual_files.remove(&name);
            continue;
        }

        let rel = relative_path(expected.cursor(), &name);
        if !actual_files.remove(&name) {
            return Err(SyncError::FileNotFound(rel));
        }

        let recorded = expected
            .file_hash(&name)?
            .ok_or_else(|| SyncError::HashNotFound(rel.clone()))?;
        let current = actual.compute_hash(&name)?;
        if recorded != current {
            if expected.ignore_changes(&name)? {
                log.info(format!("Change ignored: {}", rel.display()));
            } else {
                return Err(SyncError::HashMismatch(rel));
            }
        }
    }

    // Whatever is left in the working set has no manifest record.
    for name in actual_files {
        if filters.file_disposition(actual.cursor(), &name) == FileDisposition::AlwaysIgnore {
            continue;
        }
        let rel = relative_path(actual.cursor(), &name);
        if options.delete {
            log.info(format!("Deleting file: {}", rel.display()));
            actual.delete_file(&name)?;
        } else {
            return Err(SyncError::RedundantFile(rel));
        }
    }

    let mut actual_folders: HashSet<String> = actual
        .list(false, true)?
        .into_iter()
        .map(|entry| entry.name)
        .collect();

    for name in folders {
        if !actual_folders.remove(&name) {
            let rel = relative_path(actual.cursor(), &name);
            if options.create_missing_folders {
                log.info(format!("Creating folder: {}", rel.display()));
                actual.make_folder(&name)?;
            } else {
                return Err(SyncError::FolderNotFound(rel));
            }
        }

        expected.enter_folder(&name)?;
        if let Err(err) = actual.enter_folder(&name) {
            expected.leave_folder();
            return Err(err);
        }

        let nested = verify(expected, actual, filters, options, log);

        actual.leave_folder();
        expected.leave_folder();
        nested?;
    }

    for name in actual_folders {
        if !filters.folder_included(actual.cursor(), &name) {
            continue;
        }
        let rel = relative_path(actual.cursor(), &name);
        if options.delete {
            log.info(format!("Deleting folder: {}", rel.display()));
            actual.delete_folder(&name)?;
        } else {
            return Err(SyncError::RedundantFolder(rel));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::engine::build_manifest;
    use crate::filter::FilterRules;
    use crate::provider::{LiveTree, ManifestTree};

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

    fn manifest_of(temp_dir: &TempDir, filters: &FilterSet) -> ManifestTree {
        let mut src = LiveTree::new(temp_dir.path());
        let mut dst = ManifestTree::new();
        build_manifest(&mut src, &mut dst, filters, &Logger::silent()).unwrap();
        dst
    }

    fn run_verify(
        manifest: &mut ManifestTree,
        temp_dir: &TempDir,
        filters: &FilterSet,
        options: &VerifyOptions,
    ) -> Result<()> {
        let mut actual = LiveTree::new(temp_dir.path());
        verify(manifest, &mut actual, filters, options, &Logger::silent())
    }

    #[test]
    fn round_trip_succeeds_with_default_options() {
        let temp_dir = tree_with(&[("a.txt", "X"), ("sub/b.txt", "Y"), ("sub/deep/c.txt", "Z")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default()).unwrap();
    }

    #[test]
    fn missing_file_is_fatal_and_names_it() {
        let temp_dir = tree_with(&[("a.txt", "X"), ("sub/b.txt", "Y")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::remove_file(temp_dir.path().join("sub/b.txt")).unwrap();

        let result = run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default());
        match result {
            Err(SyncError::FileNotFound(path)) => assert_eq!(path, Path::new("sub/b.txt")),
            other => panic!("expected FileNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn content_drift_is_fatal() {
        let temp_dir = tree_with(&[("a.txt", "X")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::write(temp_dir.path().join("a.txt"), "mutated").unwrap();

        let result = run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default());
        assert!(matches!(result, Err(SyncError::HashMismatch(p)) if p == Path::new("a.txt")));
    }

    #[test]
    fn ignore_exempt_drift_is_accepted() {
        let temp_dir = tree_with(&[("config.ini", "k=v")]);
        let rules: FilterRules = serde_json::from_str(
            r#"{ "files": [ { "name": "config.ini", "action": "ignore-if-missing" } ] }"#,
        )
        .unwrap();
        let filters = FilterSet::with_rules(rules);
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::write(temp_dir.path().join("config.ini"), "k=other").unwrap();

        run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default()).unwrap();
    }

    #[test]
    fn stale_record_for_an_ignored_name_is_tolerated() {
        let temp_dir = tree_with(&[("a.txt", "X"), ("debug.log", "old")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        // A record the current policy would never produce, left behind by an
        // earlier run with different filters. It is dropped from the working
        // set without comparison, so drift underneath it does not matter.
        manifest.set_file_hash("debug.log", "stale").unwrap();
        fs::write(temp_dir.path().join("debug.log"), "drifted").unwrap();

        run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default()).unwrap();
    }

    #[test]
    fn redundant_file_fails_without_delete() {
        let temp_dir = tree_with(&[("a.txt", "X")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::write(temp_dir.path().join("extra.txt"), "?").unwrap();

        let result = run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default());
        assert!(matches!(result, Err(SyncError::RedundantFile(p)) if p == Path::new("extra.txt")));
    }

    #[test]
    fn redundant_file_is_removed_with_delete() {
        let temp_dir = tree_with(&[("a.txt", "X")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        let extra = temp_dir.path().join("extra.txt");
        fs::write(&extra, "?").unwrap();

        let options = VerifyOptions {
            delete: true,
            create_missing_folders: false,
        };
        run_verify(&mut manifest, &temp_dir, &filters, &options).unwrap();
        assert!(!extra.exists());
    }

    #[test]
    fn filter_excluded_extras_are_invisible() {
        let temp_dir = tree_with(&[("a.txt", "X")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        // Present live, excluded by policy: tolerated, not redundant.
        fs::write(temp_dir.path().join("debug.log"), "noise").unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();

        run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default()).unwrap();
        assert!(temp_dir.path().join("debug.log").exists());
        assert!(temp_dir.path().join(".git").exists());
    }

    #[test]
    fn missing_folder_fails_unless_creation_is_enabled() {
        let temp_dir = tree_with(&[("sub/b.txt", "Y")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::remove_dir_all(temp_dir.path().join("sub")).unwrap();

        let result = run_verify(&mut manifest, &temp_dir, &filters, &VerifyOptions::default());
        assert!(matches!(result, Err(SyncError::FolderNotFound(p)) if p == Path::new("sub")));
    }

    #[test]
    fn finalize_mode_creates_folder_then_reports_its_missing_file() {
        let temp_dir = tree_with(&[("sub/b.txt", "Y")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::remove_dir_all(temp_dir.path().join("sub")).unwrap();

        // The folder is recreated empty, so the recorded file inside it is
        // now the failure.
        let options = VerifyOptions {
            delete: true,
            create_missing_folders: true,
        };
        let result = run_verify(&mut manifest, &temp_dir, &filters, &options);
        assert!(matches!(result, Err(SyncError::FileNotFound(p)) if p == Path::new("sub/b.txt")));
        assert!(temp_dir.path().join("sub").is_dir());
    }

    #[test]
    fn redundant_folder_is_removed_with_delete() {
        let temp_dir = tree_with(&[("a.txt", "X")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::create_dir_all(temp_dir.path().join("extra/nested")).unwrap();
        fs::write(temp_dir.path().join("extra/nested/junk"), "?").unwrap();

        let options = VerifyOptions {
            delete: true,
            create_missing_folders: false,
        };
        run_verify(&mut manifest, &temp_dir, &filters, &options).unwrap();
        assert!(!temp_dir.path().join("extra").exists());
    }

    #[test]
    fn cursors_are_restored_after_a_failed_run() {
        let temp_dir = tree_with(&[("sub/deep/c.txt", "Z")]);
        let filters = FilterSet::default_policy();
        let mut manifest = manifest_of(&temp_dir, &filters);

        fs::write(temp_dir.path().join("sub/deep/c.txt"), "mutated").unwrap();

        let mut actual = LiveTree::new(temp_dir.path());
        let result = verify(
            &mut manifest,
            &mut actual,
            &filters,
            &VerifyOptions::default(),
            &Logger::silent(),
        );
        assert!(result.is_err());
        assert!(manifest.cursor().is_empty());
        assert!(actual.cursor().is_empty());
    }
}
