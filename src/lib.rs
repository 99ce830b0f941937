// src/lib.rs
// =============================================================================
// ghrecon: reconnaissance over a GitHub organization.
//
// Discovers an organization's repositories and its members' personal
// repositories, clones each one, pulls every blob out of its history and
// passes each file to caller-supplied hooks (secret scanners and the like).
//
// Typical use:
//
//   let client = GithubClient::new(&config)?;
//   let hooks = Hooks::new(vec![hook(|file| { /* inspect file */ })]);
//   let report = full_recon(&client, Arc::new(GitCloner::new()), url, hooks,
//                           &config, Cancellation::never()).await?;
// =============================================================================

pub mod acquire;
pub mod config;
pub mod error;
pub mod github;
pub mod hooks;
pub mod pipeline;
pub mod recon;

pub use acquire::{ExtractedFile, GitCloner};
pub use config::ReconConfig;
pub use error::{ApiError, CloneError, ReconError};
pub use github::GithubClient;
pub use pipeline::{cancellation, hook, Cancellation, Hook, Hooks};
pub use recon::{full_recon, ReconReport};
