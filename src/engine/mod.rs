//! The tree-synchronization engine.
//!
//! Three recursive algorithms, each driving one or more
//! [`TreeProvider`](crate::provider::TreeProvider)s in lock-step, depth-first
//! and strictly sequential:
//!
//! - [`build_manifest`]: fingerprint a source tree into a fresh manifest.
//! - [`verify`]: reconcile a live tree against a manifest, optionally
//!   deleting unexpected entries and creating missing folders.
//! - [`extract_delta`]: package files that changed since a baseline manifest
//!   into an archive sink while producing the next cycle's manifest.
//!
//! Within each directory, files are handled first, then folders recurse;
//! sibling order is unspecified and never load-bearing. Cursor pushes and
//! pops are paired on every exit path, including error exits — each recursion
//! site captures the nested result, restores every cursor it advanced, and
//! only then propagates the error. All failures are fatal and abort the
//! traversal at the first offending path.

mod delta;
mod hash;
mod verify;

pub use delta::{DeltaOptions, extract_delta};
pub use hash::build_manifest;
pub use verify::{VerifyOptions, verify};
