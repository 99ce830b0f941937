// src/pipeline/hooks.rs
// =============================================================================
// Hooks are the pipeline's only output: each extracted file is passed to
// every hook, in the order the hooks were registered.
//
// The hook list is shared read-only by every repository task, so hooks are
// called from several threads at once and must synchronize themselves.
// =============================================================================

use std::sync::Arc;

use crate::acquire::ExtractedFile;

/// Inspects one extracted file.
pub trait Hook: Send + Sync {
    fn inspect(&self, file: &ExtractedFile<'_>);
}

impl<F> Hook for F
where
    F: Fn(&ExtractedFile<'_>) + Send + Sync,
{
    fn inspect(&self, file: &ExtractedFile<'_>) {
        self(file)
    }
}

/// Wraps a closure as a shareable hook.
pub fn hook<F>(f: F) -> Arc<dyn Hook>
where
    F: Fn(&ExtractedFile<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered list of hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    hooks: Vec<Arc<dyn Hook>>,
}

impl Hooks {
    pub fn new(hooks: Vec<Arc<dyn Hook>>) -> Self {
        Self { hooks }
    }

    pub fn push(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Calls every hook on `file`, in order, before returning.
    pub fn dispatch(&self, file: &ExtractedFile<'_>) {
        for hook in &self.hooks {
            hook.inspect(file);
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks").field("len", &self.hooks.len()).finish()
    }
}
