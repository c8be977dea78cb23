//! Implementation of the stevedore subcommands.
//!
//! [`execute`] is a thin dispatcher; each command function wires up the tree
//! providers, invokes the engine, and persists the results. The functions are
//! public so integration tests and library consumers can drive them without
//! going through argument parsing.

use std::path::Path;

use crate::cli::{Cli, Commands};
use crate::engine::{self, DeltaOptions, VerifyOptions};
use crate::error::{Result, SyncError};
use crate::filter::{FILTER_RULES_FILE, FilterSet, MANIFEST_FILE_NAME};
use crate::logging::Logger;
use crate::provider::{ArchiveSink, LiveTree, ManifestTree, TreeProvider};

/// Execute a command based on the parsed CLI arguments.
pub fn execute(cli: &Cli) -> Result<()> {
    let quiet = cli.global_opts().quiet();
    let verbose = if quiet { 0 } else { cli.global_opts().verbose() };
    let log = Logger::new(verbose, quiet);

    match cli.command() {
        Commands::Hash { folder, no_filters } => hash(folder, !no_filters, &log),
        Commands::Verify { folder } => verify(folder, &VerifyOptions::default(), &log),
        Commands::Finalize { folder } => verify(
            folder,
            &VerifyOptions {
                delete: true,
                create_missing_folders: true,
            },
            &log,
        ),
        Commands::Delta {
            folder,
            archive,
            baseline,
            reuse_stored_hashes,
        } => {
            let count = delta(
                folder,
                baseline.as_deref(),
                archive,
                &DeltaOptions {
                    reuse_stored_hashes: *reuse_stored_hashes,
                },
                &log,
            )?;
            if count == 0 {
                return Err(SyncError::EmptyDelta);
            }
            Ok(())
        }
    }
}

fn load_filters(folder: &Path, use_rules: bool, log: &Logger) -> Result<FilterSet> {
    if use_rules {
        FilterSet::load(folder, log)
    } else {
        log.verbose(1, format!("Skipping {FILTER_RULES_FILE}; default policy only"));
        Ok(FilterSet::default_policy())
    }
}

/// Build a manifest of `folder` and write it to the reserved name at its
/// root.
pub fn hash(folder: &Path, use_rules: bool, log: &Logger) -> Result<()> {
    let filters = load_filters(folder, use_rules, log)?;
    let mut src = LiveTree::new(folder);
    let mut manifest = ManifestTree::new();

    engine::build_manifest(&mut src, &mut manifest, &filters, log)?;

    let manifest_path = folder.join(MANIFEST_FILE_NAME);
    manifest.save(&manifest_path)?;
    log.info(format!("Manifest written: {}", manifest_path.display()));
    Ok(())
}

/// Verify `folder` against its stored manifest, reconciling per `options`.
pub fn verify(folder: &Path, options: &VerifyOptions, log: &Logger) -> Result<()> {
    let filters = load_filters(folder, true, log)?;
    let mut manifest = ManifestTree::load(&folder.join(MANIFEST_FILE_NAME))?;
    let mut actual = LiveTree::new(folder);

    engine::verify(&mut manifest, &mut actual, &filters, options, log)?;
    log.info("Tree matches the manifest");
    Ok(())
}

/// Package changes in `folder` since `baseline_path` into a zip archive at
/// `archive_path`, refreshing the stored manifest for the next cycle.
///
/// Returns the number of changed files written, not counting the manifest
/// appended as the archive's final entry.
pub fn delta(
    folder: &Path,
    baseline_path: Option<&Path>,
    archive_path: &Path,
    options: &DeltaOptions,
    log: &Logger,
) -> Result<usize> {
    let mut filters = load_filters(folder, true, log)?;
    // An archive written inside the tree must never be packaged into itself.
    if let Ok(rel) = archive_path.strip_prefix(folder) {
        filters.ignore_file_at(rel);
    }
    let mut src = LiveTree::new(folder);

    let mut baseline = match baseline_path {
        Some(path) => ManifestTree::load(path)?,
        None => ManifestTree::new(),
    };

    let manifest_path = folder.join(MANIFEST_FILE_NAME);
    let mut output = if options.reuse_stored_hashes {
        ManifestTree::load(&manifest_path)?
    } else {
        ManifestTree::new()
    };

    let mut sink = ArchiveSink::create(archive_path)?;

    // The sink must be finalized exactly once, on success and failure alike.
    let packaged: Result<usize> = (|| {
        engine::extract_delta(
            &mut src,
            &mut baseline,
            &mut sink,
            &mut output,
            &filters,
            options,
            log,
        )?;

        if !options.reuse_stored_hashes {
            output.save(&manifest_path)?;
        }

        // Count before appending: the manifest rides along but is not a
        // changed file.
        let count = sink.file_count();
        sink.put_file(&manifest_path, Path::new(MANIFEST_FILE_NAME))?;
        Ok(count)
    })();

    match packaged {
        Ok(count) => {
            sink.close()?;
            log.info(format!("{count} files added"));
            Ok(count)
        }
        Err(err) => {
            let _ = sink.close();
            Err(err)
        }
    }
}
