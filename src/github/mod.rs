// src/github/mod.rs
// =============================================================================
// Everything that talks to the GitHub REST API.
//
// Submodules:
// - types:     User / Organization / Repository as GitHub returns them
// - url:       strips URL templates (`{/member}`) from list URLs
// - client:    GET + JSON decode, behind the `JsonSource` seam
// - discovery: organization -> members -> repositories, merged and filtered
//
// Only the first page of every list endpoint is read.
// =============================================================================

mod client;
mod discovery;
mod types;
mod url;

pub use client::{fetch_json, GithubClient, JsonSource};
pub use discovery::{
    build_repository_set, discover, get_organization, is_organization_duplicate, Discovery,
    DiscoveryFailure,
};
pub use types::{Organization, Repository, User, ORGANIZATION_ACCOUNT_TYPE};
pub use self::url::normalize;

#[cfg(test)]
pub(crate) use client::testing;
#[cfg(test)]
pub(crate) use discovery::fixtures;
