// src/acquire/mod.rs
// =============================================================================
// Getting file contents out of a repository.
//
// Submodules:
// - store:   in-memory blobs + trees of one clone
// - git:     the Cloner seam and the git2-backed GitCloner
// - extract: blob id -> filename resolution, one ExtractedFile per blob
// =============================================================================

mod extract;
mod git;
mod store;

pub use extract::{flatten, ExtractedFile};
pub use git::{Cloner, GitCloner};
pub use store::{EntryMode, ObjectStore, TreeEntry, TreeObject};

#[cfg(test)]
pub(crate) use git::testing;
