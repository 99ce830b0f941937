// src/pipeline/cancel.rs
// =============================================================================
// Cooperative cancellation for a whole recon run.
//
// `cancellation()` returns a handle/token pair backed by a tokio watch
// channel. The token is cloned into discovery, into every repository task and
// into git2's transfer callback; the handle (e.g. wired to Ctrl-C) flips it.
// =============================================================================

use std::future::Future;

use tokio::sync::watch;

use crate::error::ReconError;

/// Triggers cancellation. Dropping it without calling `cancel` never cancels.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

impl Cancellation {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        cancellation().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever otherwise.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let observed = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if observed.is_err() {
            // Handle dropped without cancelling.
            std::future::pending::<()>().await;
        }
    }

    /// Runs `future` unless cancellation wins first.
    pub async fn guard<F: Future>(&self, future: F) -> Result<F::Output, ReconError> {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ReconError::Cancelled),
            output = future => Ok(output),
        }
    }
}
