//! # stevedore CLI
//!
//! Detect and package directory-tree changes against a recorded manifest.
//!
//! ## Commands
//!
//! - **hash**: build the content-hash manifest of a tree
//! - **verify**: check a tree against its manifest, modify nothing
//! - **finalize**: check and reconcile (delete extras, create missing folders)
//! - **delta**: package new and changed files into a zip archive
//!
//! ## Typical cycle
//!
//! ```bash
//! # On the source side: package what changed since the last delivery
//! stevedore delta ./deploy update.zip --baseline prev-hashes.json
//!
//! # On the target side: unpack, then converge the tree
//! stevedore finalize ./deploy
//! ```
//!
//! Exit status is 0 on success and non-zero on any fatal error, including a
//! delta run that found nothing to deliver.

use std::io::IsTerminal;

use clap::Parser;
use stevedore::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    // Rich reports on a TTY, plain ones in pipelines and logs.
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse();

    stevedore::commands::execute(&cli).map_err(Into::into)
}
