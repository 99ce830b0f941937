// src/pipeline/dispatch.rs
// =============================================================================
// The concurrent part of recon: clone, flatten and hand every file to the
// hooks, for many repositories at once.
//
// How it works:
// 1. Each repository becomes one task future. The task owns an
//    Arc<Repository> from the moment it is created, nothing is handed to it
//    after it starts.
// 2. The futures go through `buffer_unordered(concurrency)`, so at most
//    `concurrency` repositories are in flight at any time.
// 3. Inside a task, clone + flatten + hook calls run on tokio's blocking
//    pool (git2 is synchronous), which is where the parallelism comes from.
// 4. A failing task (clone error, panicking hook, cancellation) is reported
//    with the stage it failed in; its siblings keep going.
// 5. run() returns only after every task has finished, cancelled or not.
//
// Per task: Pending -> Cloning -> Flattening -> Dispatching -> Done,
// and any of those can end in Failed.
//
// Within one repository, files are dispatched one at a time and every hook
// finishes with file N before any hook sees file N+1. Across repositories
// there is no ordering at all.
// =============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio::task::JoinError;

use super::cancel::Cancellation;
use super::hooks::Hooks;
use crate::acquire::{flatten, Cloner};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::github::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    Pending,
    Cloning,
    Flattening,
    Dispatching,
    Done,
    Failed,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::Pending,
            1 => TaskState::Cloning,
            2 => TaskState::Flattening,
            3 => TaskState::Dispatching,
            4 => TaskState::Done,
            _ => TaskState::Failed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Cloning => "cloning",
            TaskState::Flattening => "flattening",
            TaskState::Dispatching => "dispatching",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A repository whose every file went through the hooks.
#[derive(Debug)]
pub struct ScannedRepository {
    pub repository: Arc<Repository>,
    pub files: usize,
}

/// A repository whose task stopped early.
#[derive(Debug)]
pub struct FailedRepository {
    pub repository: Arc<Repository>,
    /// Stage the task was in when it failed.
    pub stage: TaskState,
    pub error: ReconError,
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub scanned: Vec<ScannedRepository>,
    pub failed: Vec<FailedRepository>,
}

impl PipelineReport {
    /// Files dispatched across all successfully scanned repositories.
    pub fn files(&self) -> usize {
        self.scanned.iter().map(|s| s.files).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs acquisition + flattening + hooks over a set of repositories.
pub struct Pipeline<C> {
    cloner: Arc<C>,
    hooks: Arc<Hooks>,
    concurrency: usize,
    cancel: Cancellation,
}

impl<C: Cloner> Pipeline<C> {
    pub fn new(cloner: Arc<C>, hooks: Hooks, config: &ReconConfig, cancel: Cancellation) -> Self {
        Self {
            cloner,
            hooks: Arc::new(hooks),
            concurrency: config.effective_concurrency(),
            cancel,
        }
    }

    /// Processes every repository and returns once all tasks have finished.
    pub async fn run(&self, repositories: Vec<Repository>) -> PipelineReport {
        info!(
            "scanning {} repositories, {} at a time",
            repositories.len(),
            self.concurrency
        );

        let tasks = repositories.into_iter().map(|repository| {
            RepositoryTask {
                repository: Arc::new(repository),
                cloner: Arc::clone(&self.cloner),
                hooks: Arc::clone(&self.hooks),
                cancel: self.cancel.clone(),
            }
            .run()
        });

        let outcomes: Vec<Result<ScannedRepository, FailedRepository>> = stream::iter(tasks)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = PipelineReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(scanned) => report.scanned.push(scanned),
                Err(failed) => report.failed.push(failed),
            }
        }
        report
    }
}

struct RepositoryTask<C> {
    repository: Arc<Repository>,
    cloner: Arc<C>,
    hooks: Arc<Hooks>,
    cancel: Cancellation,
}

impl<C: Cloner> RepositoryTask<C> {
    async fn run(self) -> Result<ScannedRepository, FailedRepository> {
        let RepositoryTask {
            repository,
            cloner,
            hooks,
            cancel,
        } = self;
        let progress = Arc::new(Progress::new(Arc::clone(&repository)));

        let result = if cancel.is_cancelled() {
            Err(ReconError::Cancelled)
        } else {
            let blocking = {
                let repository = Arc::clone(&repository);
                let progress = Arc::clone(&progress);
                let cancel = cancel.clone();
                tokio::task::spawn_blocking(move || {
                    acquire_and_dispatch(&*cloner, &hooks, &repository, &cancel, &progress)
                })
            };

            // Joined even when cancelled. The blocking side stops at the next
            // transfer callback or file, and must not outlive run().
            match blocking.await {
                Ok(result) => result,
                Err(join_error) => Err(ReconError::TaskPanicked {
                    message: panic_message(join_error),
                }),
            }
        };

        match result {
            Ok(files) => {
                progress.enter(TaskState::Done);
                info!("{}: {} file(s) dispatched", repository.full_name, files);
                Ok(ScannedRepository { repository, files })
            }
            Err(error) => {
                let stage = progress.current();
                progress.enter(TaskState::Failed);
                warn!("{}: failed while {}: {}", repository.full_name, stage, error);
                Err(FailedRepository {
                    repository,
                    stage,
                    error,
                })
            }
        }
    }
}

// Runs on the blocking pool. Cancellation is checked between stages and
// before every file so an aborted run stops calling hooks promptly.
fn acquire_and_dispatch<C: Cloner>(
    cloner: &C,
    hooks: &Hooks,
    repository: &Repository,
    cancel: &Cancellation,
    progress: &Progress,
) -> Result<usize, ReconError> {
    progress.enter(TaskState::Cloning);
    let store = cloner.clone_repository(&repository.clone_url, cancel)?;
    ensure_live(cancel)?;

    progress.enter(TaskState::Flattening);
    let files = flatten(store, repository);

    progress.enter(TaskState::Dispatching);
    for file in &files {
        ensure_live(cancel)?;
        hooks.dispatch(file);
    }
    Ok(files.len())
}

fn ensure_live(cancel: &Cancellation) -> Result<(), ReconError> {
    if cancel.is_cancelled() {
        return Err(ReconError::Cancelled);
    }
    Ok(())
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// Current stage of one task, shared between the async side and the
// blocking closure.
struct Progress {
    repository: Arc<Repository>,
    state: AtomicU8,
}

impl Progress {
    fn new(repository: Arc<Repository>) -> Self {
        Self {
            repository,
            state: AtomicU8::new(TaskState::Pending as u8),
        }
    }

    fn enter(&self, next: TaskState) {
        let previous = TaskState::from_u8(self.state.swap(next as u8, Ordering::SeqCst));
        debug!("{}: {} -> {}", self.repository.full_name, previous, next);
    }

    fn current(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does buffer_unordered do here?
//    - stream::iter turns the task futures into a stream
//    - buffer_unordered(N) polls at most N of them at once and yields results
//      as they finish, so finished repositories make room for the next ones
//    - The same call link-checking code uses to cap concurrent HTTP requests
//
// 2. Why spawn_blocking?
//    - git2 is a synchronous C library; calling it directly inside async code
//      would stall a runtime worker thread
//    - spawn_blocking moves the closure to a thread pool meant for blocking work
//    - The closure must own everything it uses ('static), hence the Arc clones
//
// 3. Why Arc<Repository>?
//    - The async side keeps the repository for the report, the blocking
//      closure borrows it for every ExtractedFile
//    - Arc::clone only bumps a reference count, the Repository is not copied
//
// 4. What happens when a hook panics?
//    - The panic unwinds the blocking thread, not the whole program
//    - Awaiting the JoinHandle returns Err(JoinError) with is_panic() == true
//    - We turn that into a FailedRepository and the other tasks continue
// -----------------------------------------------------------------------------
