// src/acquire/extract.rs
// =============================================================================
// Turns a cloned object store into a flat list of files.
//
// 1. Walk every tree in the store (not just the tip commit's tree, so files
//    deleted in later commits still show up) and map each regular-file
//    entry's blob id to its entry name.
// 2. Emit one ExtractedFile per blob, named from that map.
//
// Known lossy cases, kept on purpose:
// - A blob no walked tree references as a regular file (e.g. only ever
//   committed as executable or as a symlink target) gets an empty filename.
// - A blob stored under two names gets whichever name the tree walk saw
//   last; tree order is unspecified.
// - Names are entry names, not full paths.
// =============================================================================

use std::collections::HashMap;

use git2::Oid;

use super::store::{EntryMode, ObjectStore};
use crate::github::Repository;

/// One blob pulled out of a repository, ready to hand to hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile<'a> {
    pub filename: String,
    pub content: Vec<u8>,
    pub source_repository: &'a Repository,
}

impl ExtractedFile<'_> {
    /// Content as text; invalid UTF-8 is replaced, not rejected.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Flattens `store` into one record per blob. Order is unspecified.
pub fn flatten(store: ObjectStore, repository: &Repository) -> Vec<ExtractedFile<'_>> {
    let names = resolve_names(&store);

    store
        .into_blobs()
        .map(|(id, content)| ExtractedFile {
            filename: names.get(&id).cloned().unwrap_or_default(),
            content,
            source_repository: repository,
        })
        .collect()
}

fn resolve_names(store: &ObjectStore) -> HashMap<Oid, String> {
    let mut names = HashMap::new();
    for tree in store.trees() {
        for entry in &tree.entries {
            if entry.mode == EntryMode::Regular {
                names.insert(entry.id, entry.name.clone());
            }
        }
    }
    names
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is the `'a` in ExtractedFile<'a>?
//    - A lifetime: the file borrows its Repository instead of owning a copy
//    - The compiler checks no ExtractedFile outlives the Repository it points to
//
// 2. Why does flatten take the ObjectStore by value?
//    - into_blobs() moves each blob's bytes into its ExtractedFile
//    - No file content is copied, and the store is gone afterwards
//
// 3. What does unwrap_or_default() do on Option<String>?
//    - Some(name) -> name, None -> String::new() (the empty filename)
// -----------------------------------------------------------------------------
