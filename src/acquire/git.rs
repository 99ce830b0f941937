// src/acquire/git.rs
// =============================================================================
// Repository acquisition.
//
// `Cloner` is the seam the pipeline clones through; `GitCloner` is the git2
// implementation. Each call:
// 1. creates a private scratch directory
// 2. bare-clones the remote into it (full history, no shallow clone)
// 3. reads every object in the object database into an ObjectStore
// 4. deletes the scratch directory when it returns
//
// Nothing survives between calls, so a repository listed twice is cloned twice.
// Cloning is blocking; the pipeline runs it on tokio's blocking pool.
// =============================================================================

use git2::build::RepoBuilder;
use git2::{FetchOptions, ObjectType, Oid, RemoteCallbacks};
use log::debug;

use super::store::{EntryMode, ObjectStore, TreeEntry, TreeObject};
use crate::error::CloneError;
use crate::pipeline::Cancellation;

/// Clones a remote into an isolated, in-memory object store.
pub trait Cloner: Send + Sync + 'static {
    fn clone_repository(
        &self,
        remote_url: &str,
        cancel: &Cancellation,
    ) -> Result<ObjectStore, CloneError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitCloner;

impl GitCloner {
    pub fn new() -> Self {
        Self
    }
}

impl Cloner for GitCloner {
    fn clone_repository(
        &self,
        remote_url: &str,
        cancel: &Cancellation,
    ) -> Result<ObjectStore, CloneError> {
        if cancel.is_cancelled() {
            return Err(CloneError::Cancelled {
                url: remote_url.to_string(),
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("ghrecon-")
            .tempdir()
            .map_err(|source| CloneError::Scratch { source })?;

        // Returning false from the progress callback aborts the transfer.
        let mut callbacks = RemoteCallbacks::new();
        let transfer_cancel = cancel.clone();
        callbacks.transfer_progress(move |_| !transfer_cancel.is_cancelled());

        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(callbacks);

        let git_error = |source| {
            if cancel.is_cancelled() {
                CloneError::Cancelled {
                    url: remote_url.to_string(),
                }
            } else {
                CloneError::Git {
                    url: remote_url.to_string(),
                    source,
                }
            }
        };

        let repo = RepoBuilder::new()
            .bare(true)
            .fetch_options(fetch)
            .clone(remote_url, scratch.path())
            .map_err(git_error)?;

        let store = read_object_store(&repo).map_err(git_error)?;
        if store.is_empty() {
            return Err(CloneError::EmptyRepository {
                url: remote_url.to_string(),
            });
        }

        debug!(
            "{}: {} blob(s), {} tree(s)",
            remote_url,
            store.blob_count(),
            store.tree_count()
        );
        Ok(store)
    }
}

fn read_object_store(repo: &git2::Repository) -> Result<ObjectStore, git2::Error> {
    let odb = repo.odb()?;

    let mut ids: Vec<Oid> = Vec::new();
    odb.foreach(|id| {
        ids.push(*id);
        true
    })?;

    let mut store = ObjectStore::new();
    for id in ids {
        let object = odb.read(id)?;
        match object.kind() {
            ObjectType::Blob => store.insert_blob(id, object.data().to_vec()),
            ObjectType::Tree => {
                let tree = repo.find_tree(id)?;
                let entries = tree
                    .iter()
                    .map(|entry| TreeEntry {
                        name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                        id: entry.id(),
                        mode: EntryMode::from_raw(entry.filemode()),
                    })
                    .collect();
                store.insert_tree(id, TreeObject { entries });
            }
            // Commits and tags carry no file content.
            _ => {}
        }
    }
    Ok(store)
}
