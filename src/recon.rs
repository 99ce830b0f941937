// src/recon.rs
// =============================================================================
// One full recon run: discover the organization, build the repository set,
// then scan every repository through the hooks.
//
// Discovery is sequential and finishes before the first clone starts.
// =============================================================================

use std::sync::Arc;

use crate::acquire::Cloner;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::github::{discover, DiscoveryFailure, JsonSource, Organization};
use crate::pipeline::{Cancellation, Hooks, Pipeline, PipelineReport};

/// Outcome of a recon run that got past the organization lookup.
#[derive(Debug)]
pub struct ReconReport {
    pub organization: Organization,
    pub member_count: usize,
    pub discovery_failures: Vec<DiscoveryFailure>,
    pub pipeline: PipelineReport,
}

impl ReconReport {
    /// True when nothing failed, in discovery or in any repository.
    pub fn is_complete(&self) -> bool {
        self.discovery_failures.is_empty() && self.pipeline.is_complete()
    }
}

/// Runs discovery for the organization at `url` and feeds every discovered
/// repository's files through `hooks`.
///
/// Fails only when the organization itself cannot be fetched or the run is
/// cancelled during discovery; every later failure is in the report.
pub async fn full_recon<S, C>(
    source: &S,
    cloner: Arc<C>,
    url: &str,
    hooks: Hooks,
    config: &ReconConfig,
    cancel: Cancellation,
) -> Result<ReconReport, ReconError>
where
    S: JsonSource,
    C: Cloner,
{
    let discovery = discover(source, url, &cancel).await?;

    let pipeline = Pipeline::new(cloner, hooks, config, cancel);
    let report = pipeline.run(discovery.repositories).await;

    Ok(ReconReport {
        organization: discovery.organization,
        member_count: discovery.members.len(),
        discovery_failures: discovery.failures,
        pipeline: report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::testing::FakeCloner;
    use crate::acquire::ExtractedFile;
    use crate::github::fixtures::{organization, repository, to_json, user};
    use crate::github::testing::FakeSource;
    use crate::pipeline::hook;
    use std::sync::Mutex;

    const ORG_URL: &str = "https://api.example.com/orgs/acme";

    // acme owns r1; member bob lists r2 and acme's r1 again.
    fn acme() -> (FakeSource, FakeCloner) {
        let acme = user("acme", 100, "Organization");
        let bob = user("bob", 2, "User");
        let r1 = repository(1, acme.clone(), "r1");
        let r2 = repository(2, bob.clone(), "r2");

        let source = FakeSource::new()
            .with_body(ORG_URL, &to_json(&organization("acme")))
            .with_body(
                "https://api.example.com/orgs/acme/members",
                &to_json(&vec![bob.clone()]),
            )
            .with_body(
                "https://api.example.com/orgs/acme/repos",
                &to_json(&vec![r1.clone()]),
            )
            .with_body(
                "https://api.example.com/users/bob/repos",
                &to_json(&vec![r2.clone(), r1.clone()]),
            );

        let cloner = FakeCloner::new()
            .with_repo(&r1.clone_url, &[("README.md", "# r1"), ("config.yml", "a: 1")])
            .with_repo(&r2.clone_url, &[("main.rs", "fn main() {}")]);

        (source, cloner)
    }

    #[tokio::test]
    async fn test_end_to_end_acme() {
        let (source, cloner) = acme();
        let cloner = Arc::new(cloner);
        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
        let hooks = {
            let seen = Arc::clone(&seen);
            Hooks::new(vec![hook(move |file: &ExtractedFile<'_>| {
                seen.lock().unwrap().push((
                    file.source_repository.full_name.clone(),
                    file.filename.clone(),
                ));
            })])
        };

        let report = full_recon(
            &source,
            Arc::clone(&cloner),
            ORG_URL,
            hooks,
            &ReconConfig::default(),
            Cancellation::never(),
        )
        .await
        .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.organization.login, "acme");
        assert_eq!(report.member_count, 1);
        assert_eq!(report.pipeline.scanned.len(), 2);

        // r1 is cloned once even though bob's listing repeats it.
        let mut calls = cloner.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                "https://git.example.com/acme/r1.git".to_string(),
                "https://git.example.com/bob/r2.git".to_string(),
            ]
        );

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("acme/r1".to_string(), "README.md".to_string()),
                ("acme/r1".to_string(), "config.yml".to_string()),
                ("bob/r2".to_string(), "main.rs".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unclonable_repository_is_reported() {
        let (source, _) = acme();
        // Only r2 can be cloned.
        let cloner = Arc::new(
            FakeCloner::new().with_repo("https://git.example.com/bob/r2.git", &[("a", "b")]),
        );

        let report = full_recon(
            &source,
            cloner,
            ORG_URL,
            Hooks::default(),
            &ReconConfig::default(),
            Cancellation::never(),
        )
        .await
        .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.pipeline.scanned.len(), 1);
        assert_eq!(report.pipeline.scanned[0].repository.full_name, "bob/r2");
        assert_eq!(report.pipeline.failed.len(), 1);
        assert_eq!(report.pipeline.failed[0].repository.full_name, "acme/r1");
    }

    #[tokio::test]
    async fn test_missing_organization_is_an_error() {
        let source = FakeSource::new();
        let result = full_recon(
            &source,
            Arc::new(FakeCloner::new()),
            ORG_URL,
            Hooks::default(),
            &ReconConfig::default(),
            Cancellation::never(),
        )
        .await;
        assert!(result.is_err());
    }
}
