// src/github/client.rs
// =============================================================================
// The narrow GET + JSON decode interface the rest of recon talks through.
//
// `JsonSource` is the seam: production code uses `GithubClient` (reqwest),
// tests use an in-memory map of URL -> body. Everything above this file only
// ever calls `fetch_json`.
//
// Status handling:
// - 2xx          -> body bytes
// - 403          -> RateLimited when x-ratelimit-remaining is "0", else Forbidden
// - anything else -> Status
// =============================================================================

use std::future::Future;

use log::debug;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ReconConfig;
use crate::error::ApiError;

/// Anything that can GET a URL and hand back the raw response body.
pub trait JsonSource: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;
}

/// Fetches `url` and decodes the body as `T`.
pub async fn fetch_json<T, S>(source: &S, url: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    S: JsonSource,
{
    let body = source.get(url).await?;
    serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Unauthenticated GitHub REST client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
}

impl GithubClient {
    pub fn new(config: &ReconConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { client })
    }
}

impl JsonSource for GithubClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        debug!("GET {}", url);

        let network = |source| ApiError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(classify_forbidden(url, response.headers()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(network)?;
        Ok(body.to_vec())
    }
}

// GitHub uses 403 for both exhausted quota and denied access. The rate-limit
// headers are the only way to tell them apart.
fn classify_forbidden(url: &str, headers: &HeaderMap) -> ApiError {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if header("x-ratelimit-remaining").map(str::trim) == Some("0") {
        ApiError::RateLimited {
            url: url.to_string(),
            reset: header("x-ratelimit-reset").and_then(|v| v.trim().parse().ok()),
        }
    } else {
        ApiError::Forbidden {
            url: url.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `impl Future<Output = ...> + Send` in a trait?
//    - It lets a trait method be async while promising the future can move
//      between threads
//    - Implementations can simply write `async fn get(...)`
//
// 2. Why return Vec<u8> instead of T from the trait?
//    - Generic methods make fakes harder to write
//    - Decoding happens once, in fetch_json, for every source
//
// 3. What does `serde::de::DeserializeOwned` mean?
//    - T can be built from JSON without borrowing from the input buffer
//    - Needed because the body is dropped when fetch_json returns
// -----------------------------------------------------------------------------
