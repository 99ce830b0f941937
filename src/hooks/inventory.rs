// src/hooks/inventory.rs
// =============================================================================
// Counts what each repository yielded: files, bytes, and how many blobs had
// no name (never referenced as a regular file by any tree).
// =============================================================================

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use log::info;
use serde::Serialize;

use crate::acquire::ExtractedFile;
use crate::pipeline::Hook;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryTotals {
    pub files: usize,
    pub bytes: usize,
    pub unnamed: usize,
}

#[derive(Debug, Default)]
pub struct Inventory {
    list_files: bool,
    totals: Mutex<HashMap<String, RepositoryTotals>>,
}

impl Inventory {
    /// With `list_files`, every file is also logged as it is seen.
    pub fn new(list_files: bool) -> Self {
        Self {
            list_files,
            totals: Mutex::default(),
        }
    }

    /// Totals keyed by repository full name.
    pub fn totals(&self) -> BTreeMap<String, RepositoryTotals> {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, totals)| (name.clone(), totals.clone()))
            .collect()
    }
}

impl Hook for Inventory {
    fn inspect(&self, file: &ExtractedFile<'_>) {
        let repository = &file.source_repository.full_name;
        if self.list_files {
            let name = if file.filename.is_empty() {
                "<unnamed>"
            } else {
                file.filename.as_str()
            };
            info!("{}: {} ({} bytes)", repository, name, file.content.len());
        }

        let mut totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = totals.entry(repository.clone()).or_default();
        entry.files += 1;
        entry.bytes += file.content.len();
        if file.filename.is_empty() {
            entry.unnamed += 1;
        }
    }
}
