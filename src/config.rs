// src/config.rs
// =============================================================================
// Runtime settings shared by the API client and the dispatch pipeline.
//
// The CLI fills this in from flags / GHRECON_* environment variables, library
// callers build it directly or start from Default.
// =============================================================================

use std::time::Duration;

/// Default number of repositories cloned and scanned at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default per-request timeout for GitHub API calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one recon run.
#[derive(Debug, Clone)]
pub struct ReconConfig {
    /// Upper bound on repositories in flight (clone + flatten + hooks).
    pub concurrency: usize,
    /// Timeout applied to every GitHub API request.
    pub request_timeout: Duration,
    /// Sent with every API request; GitHub rejects requests without one.
    pub user_agent: String,
}

impl ReconConfig {
    /// Concurrency as actually used; zero would stall the pipeline.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
