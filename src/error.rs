// src/error.rs
// =============================================================================
// Typed errors for every stage of a recon run.
//
// - ApiError:   anything that goes wrong talking to the GitHub REST API
// - CloneError: anything that goes wrong acquiring a repository
// - ReconError: what a single discovery call or repository task reports
//
// None of these abort a run on their own. The orchestration layer decides:
// only a failure to fetch the organization itself ends discovery, every
// other failure is collected into the final report.
// =============================================================================

use thiserror::Error;

/// Failure of a single GitHub API call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP 403 with `x-ratelimit-remaining: 0`.
    #[error("rate limited by GitHub fetching {url}{}", reset.map(|r| format!(" (resets at {})", r)).unwrap_or_default())]
    RateLimited { url: String, reset: Option<u64> },

    /// HTTP 403 while rate-limit quota remains, or with no rate-limit headers.
    #[error("access forbidden fetching {url}")]
    Forbidden { url: String },

    /// Any other non-success status.
    #[error("unexpected HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// The body was not JSON of the expected shape.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A templated URL had no usable `scheme://host/path` prefix.
    #[error("no usable URL in {template:?}")]
    UnusableUrl { template: String },

    /// The HTTP client itself could not be built.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// GitHub answers 403 both when quota is exhausted and when access is
    /// denied. Callers that only care about "403 happened" use this.
    pub fn is_rate_limited_or_unauthorized(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. } | ApiError::Forbidden { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode { .. })
    }
}

/// Failure to acquire a repository's object graph.
#[derive(Error, Debug)]
pub enum CloneError {
    #[error("could not clone {url}: {source}")]
    Git {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("could not create scratch directory for clone: {source}")]
    Scratch {
        #[source]
        source: std::io::Error,
    },

    #[error("{url} has no objects")]
    EmptyRepository { url: String },

    #[error("clone of {url} was cancelled")]
    Cancelled { url: String },
}

/// What a discovery call or a repository task reports when it fails.
#[derive(Error, Debug)]
pub enum ReconError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Clone(#[from] CloneError),

    #[error("run was cancelled")]
    Cancelled,

    #[error("repository task panicked: {message}")]
    TaskPanicked { message: String },
}

impl ReconError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ReconError::Cancelled | ReconError::Clone(CloneError::Cancelled { .. })
        )
    }
}
