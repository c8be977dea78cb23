use std::fmt::Display;

/// Minimal stderr logger threaded through commands and the sync engine.
///
/// Reconciliation events (ignored drift, deletions, folder creations) go
/// through [`Logger::info`]; traversal detail is gated behind verbosity
/// levels. Quiet mode silences everything except errors, which are reported
/// through the error chain rather than the logger.
#[derive(Clone, Copy, Debug)]
pub struct Logger {
    verbose: u8,
    quiet: bool,
}

impl Logger {
    pub fn new(verbose: u8, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Logger that emits nothing; used by tests and library callers.
    pub fn silent() -> Self {
        Self {
            verbose: 0,
            quiet: true,
        }
    }

    pub fn info(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    pub fn verbose(&self, level: u8, message: impl Display) {
        if !self.quiet && self.verbose >= level {
            eprintln!("{message}");
        }
    }
}
