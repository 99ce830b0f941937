// src/pipeline/mod.rs
// =============================================================================
// Concurrent dispatch of extracted files to hooks.
//
// Submodules:
// - hooks:    the Hook trait and the ordered hook list
// - cancel:   run-wide cancellation token
// - dispatch: bounded per-repository tasks and their report
// =============================================================================

mod cancel;
mod dispatch;
mod hooks;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use dispatch::{FailedRepository, Pipeline, PipelineReport, ScannedRepository, TaskState};
pub use hooks::{hook, Hook, Hooks};
