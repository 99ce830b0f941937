// src/acquire/store.rs
// =============================================================================
// In-memory copy of one repository's object graph: every blob's bytes and
// every tree's entry list, keyed by object id.
//
// A store is built by a single clone, owned by the task that cloned it, and
// consumed by flattening. Nothing shares or reuses it.
// =============================================================================

use std::collections::HashMap;

use git2::Oid;

/// Kind of a tree entry, from its git file mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// 100644
    Regular,
    /// 100755
    Executable,
    /// 120000
    Symlink,
    /// 040000
    Tree,
    /// 160000
    Submodule,
    Other(i32),
}

impl EntryMode {
    pub fn from_raw(mode: i32) -> Self {
        match mode {
            0o100644 => EntryMode::Regular,
            0o100755 => EntryMode::Executable,
            0o120000 => EntryMode::Symlink,
            0o040000 => EntryMode::Tree,
            0o160000 => EntryMode::Submodule,
            other => EntryMode::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub id: Oid,
    pub mode: EntryMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeObject {
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Default)]
pub struct ObjectStore {
    blobs: HashMap<Oid, Vec<u8>>,
    trees: HashMap<Oid, TreeObject>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_blob(&mut self, id: Oid, content: Vec<u8>) {
        self.blobs.insert(id, content);
    }

    pub fn insert_tree(&mut self, id: Oid, tree: TreeObject) {
        self.trees.insert(id, tree);
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty() && self.trees.is_empty()
    }

    /// All trees, in no particular order.
    pub fn trees(&self) -> impl Iterator<Item = &TreeObject> {
        self.trees.values()
    }

    /// Consumes the store, yielding every blob with its id.
    pub fn into_blobs(self) -> impl Iterator<Item = (Oid, Vec<u8>)> {
        self.blobs.into_iter()
    }
}
