// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every tuning flag can also come from a GHRECON_* environment variable, so
// CI jobs can configure runs without touching the command line.
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::builder::TypedValueParser;
use clap::Parser;
use url::Url;

use ghrecon::config::{
    default_user_agent, ReconConfig, DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT,
};

/// Where GitHub's REST API lives; bare organization handles resolve here.
const GITHUB_API: &str = "https://api.github.com";

#[derive(Parser, Debug)]
#[command(
    name = "ghrecon",
    version,
    about = "Clone every repository of a GitHub organization and its members, and scan every blob",
    long_about = "ghrecon lists an organization's repositories and the personal repositories of its \
                  members, clones each one, and runs the built-in hooks over every blob in its \
                  history (including files deleted in later commits)."
)]
pub struct Cli {
    /// Organization to scan: a handle (`acme`) or an API URL
    /// (`https://api.github.com/orgs/acme`)
    pub target: String,

    /// Number of repositories cloned and scanned at the same time
    #[arg(
        long,
        env = "GHRECON_CONCURRENCY",
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    pub concurrency: usize,

    /// Timeout for each GitHub API request, in seconds
    #[arg(long, env = "GHRECON_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// User-Agent sent to the GitHub API
    #[arg(long, env = "GHRECON_USER_AGENT", default_value_t = default_user_agent())]
    pub user_agent: String,

    /// Output findings as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Log every extracted file as it is scanned
    #[arg(long)]
    pub list_files: bool,

    /// Debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> ReconConfig {
        ReconConfig {
            concurrency: self.concurrency,
            request_timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
        }
    }

    /// The organization API URL to start discovery from.
    pub fn organization_url(&self) -> Result<String> {
        organization_url(&self.target)
    }
}

fn organization_url(target: &str) -> Result<String> {
    let target = target.trim();
    if target.contains("://") {
        let url = Url::parse(target).map_err(|e| anyhow!("Invalid URL '{}': {}", target, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("Unsupported URL scheme: {}", url.scheme()));
        }
        return Ok(target.to_string());
    }

    let valid_handle = !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid_handle {
        return Err(anyhow!("Not an organization handle or URL: {}", target));
    }
    Ok(format!("{}/orgs/{}", GITHUB_API, target))
}
