// src/github/discovery.rs
// =============================================================================
// Organization discovery: who is in the organization and which repositories
// should be scanned.
//
// Flow (all sequential, nothing runs concurrently here):
// 1. Fetch the organization
// 2. Fetch its members (first page only)
// 3. Fetch the organization's own repositories (first page only)
// 4. Fetch each member's personal repositories (first page only)
// 5. Merge, dropping member-listed repositories that the organization owns
//
// Only step 1 is fatal. Any other failed call is recorded and discovery
// carries on with whatever it already has.
// =============================================================================

use log::{info, warn};

use super::client::{fetch_json, JsonSource};
use super::types::{Organization, Repository, User};
use super::url::normalize;
use crate::error::{ApiError, ReconError};
use crate::pipeline::Cancellation;

impl Organization {
    /// Members of the organization. A body that does not decode as a list of
    /// users yields an empty list instead of an error.
    pub async fn members<S: JsonSource>(&self, source: &S) -> Result<Vec<User>, ApiError> {
        let url = usable_url(&self.members_url)?;
        match fetch_json(source, &url).await {
            Ok(users) => Ok(users),
            Err(err) if err.is_decode() => {
                warn!("treating {} as having no members: {}", self.login, err);
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Repositories owned directly by the organization.
    pub async fn repositories<S: JsonSource>(
        &self,
        source: &S,
    ) -> Result<Vec<Repository>, ApiError> {
        fetch_repositories(source, &self.repositories_url).await
    }
}

impl User {
    /// The user's personal repository listing. GitHub may include
    /// organization-owned repositories here.
    pub async fn repositories<S: JsonSource>(
        &self,
        source: &S,
    ) -> Result<Vec<Repository>, ApiError> {
        fetch_repositories(source, &self.repositories_url).await
    }
}

pub async fn get_organization<S: JsonSource>(
    source: &S,
    url: &str,
) -> Result<Organization, ApiError> {
    fetch_json(source, url).await
}

async fn fetch_repositories<S: JsonSource>(
    source: &S,
    templated_url: &str,
) -> Result<Vec<Repository>, ApiError> {
    let url = usable_url(templated_url)?;
    fetch_json(source, &url).await
}

fn usable_url(templated: &str) -> Result<String, ApiError> {
    let url = normalize(templated);
    if url.is_empty() {
        return Err(ApiError::UnusableUrl {
            template: templated.to_string(),
        });
    }
    Ok(url)
}

/// True when a member's listing re-reports a repository the organization
/// itself owns. Matching is on owner type and login, not repository id.
pub fn is_organization_duplicate(organization: &Organization, repository: &Repository) -> bool {
    repository.owner.is_organization() && repository.owner.login == organization.login
}

/// Merges the organization's repositories with every member's listing.
///
/// Organization-owned entries in member listings are skipped. Nothing else is
/// deduplicated: a repository that appears in two members' listings (a shared
/// fork, a repository owned by another organization) is kept twice and will
/// be scanned twice.
pub fn build_repository_set<I>(
    organization: &Organization,
    organization_repositories: Vec<Repository>,
    member_repositories: I,
) -> Vec<Repository>
where
    I: IntoIterator<Item = Vec<Repository>>,
{
    let mut repositories = organization_repositories;
    for listing in member_repositories {
        repositories.extend(
            listing
                .into_iter()
                .filter(|repo| !is_organization_duplicate(organization, repo)),
        );
    }
    repositories
}

/// A discovery call that failed without stopping discovery.
#[derive(Debug)]
pub struct DiscoveryFailure {
    /// What was being fetched, e.g. "members of acme" or "repositories of bob".
    pub subject: String,
    pub error: ApiError,
}

/// Everything discovery found.
#[derive(Debug)]
pub struct Discovery {
    pub organization: Organization,
    pub members: Vec<User>,
    pub repositories: Vec<Repository>,
    pub failures: Vec<DiscoveryFailure>,
}

/// Runs discovery for the organization at `url`.
pub async fn discover<S: JsonSource>(
    source: &S,
    url: &str,
    cancel: &Cancellation,
) -> Result<Discovery, ReconError> {
    let organization = cancel.guard(get_organization(source, url)).await??;
    info!("organization {} (id {})", organization.login, organization.id);

    let mut failures = Vec::new();

    let members = match cancel.guard(organization.members(source)).await? {
        Ok(members) => members,
        Err(error) => {
            warn!("could not list members of {}: {}", organization.login, error);
            failures.push(DiscoveryFailure {
                subject: format!("members of {}", organization.login),
                error,
            });
            Vec::new()
        }
    };
    info!("{} member(s)", members.len());

    let organization_repositories =
        match cancel.guard(organization.repositories(source)).await? {
            Ok(repositories) => repositories,
            Err(error) => {
                warn!("could not list repositories of {}: {}", organization.login, error);
                failures.push(DiscoveryFailure {
                    subject: format!("repositories of {}", organization.login),
                    error,
                });
                Vec::new()
            }
        };

    let mut member_repositories = Vec::with_capacity(members.len());
    for member in &members {
        match cancel.guard(member.repositories(source)).await? {
            Ok(repositories) => member_repositories.push(repositories),
            Err(error) => {
                warn!("could not list repositories of {}: {}", member.login, error);
                failures.push(DiscoveryFailure {
                    subject: format!("repositories of {}", member.login),
                    error,
                });
            }
        }
    }

    let repositories =
        build_repository_set(&organization, organization_repositories, member_repositories);
    info!("{} repositories to scan", repositories.len());

    Ok(Discovery {
        organization,
        members,
        repositories,
        failures,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn user(login: &str, id: u64, account_type: &str) -> User {
        User {
            login: login.to_string(),
            id,
            account_type: account_type.to_string(),
            repositories_url: format!("https://api.example.com/users/{}/repos", login),
        }
    }

    pub fn repository(id: u64, owner: User, name: &str) -> Repository {
        Repository {
            id,
            full_name: format!("{}/{}", owner.login, name),
            clone_url: format!("https://git.example.com/{}/{}.git", owner.login, name),
            owner,
            name: name.to_string(),
        }
    }

    pub fn organization(login: &str) -> Organization {
        Organization {
            id: 100,
            login: login.to_string(),
            repositories_url: format!("https://api.example.com/orgs/{}/repos", login),
            members_url: format!("https://api.example.com/orgs/{}/members{{/member}}", login),
        }
    }

    pub fn to_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::github::client::testing::{FakeSource, Reply};

    const ORG_URL: &str = "https://api.example.com/orgs/acme";

    #[test]
    fn test_org_owned_repo_in_member_listing_is_skipped() {
        let org = organization("acme");
        let acme = user("acme", 100, "Organization");
        let bob = user("bob", 2, "User");

        let merged = build_repository_set(
            &org,
            vec![repository(1, acme.clone(), "r1")],
            vec![vec![
                repository(2, bob.clone(), "r2"),
                repository(1, acme.clone(), "r1"),
            ]],
        );

        let ids: Vec<u64> = merged.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_user_account_with_org_login_is_kept() {
        let org = organization("acme");
        let impostor = user("acme", 555, "User");

        let merged = build_repository_set(
            &org,
            Vec::new(),
            vec![vec![repository(9, impostor, "lookalike")]],
        );

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 9);
    }

    #[test]
    fn test_other_organization_is_kept() {
        let org = organization("acme");
        let other = user("globex", 300, "Organization");
        assert!(!is_organization_duplicate(
            &org,
            &repository(5, other, "shared")
        ));
    }

    // Repositories are not deduplicated by id: two members listing the same
    // repository means it is scanned twice.
    #[test]
    fn test_same_repository_from_two_members_is_kept_twice() {
        let org = organization("acme");
        let carol = user("carol", 3, "User");
        let shared = repository(77, carol, "shared-fork");

        let merged = build_repository_set(
            &org,
            Vec::new(),
            vec![vec![shared.clone()], vec![shared.clone()]],
        );

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|r| r.id == 77));
    }

    fn acme_source() -> FakeSource {
        let org = organization("acme");
        let acme = user("acme", 100, "Organization");
        let bob = user("bob", 2, "User");

        FakeSource::new()
            .with_body(ORG_URL, &to_json(&org))
            .with_body(
                "https://api.example.com/orgs/acme/members",
                &to_json(&vec![bob.clone()]),
            )
            .with_body(
                "https://api.example.com/orgs/acme/repos",
                &to_json(&vec![repository(1, acme.clone(), "r1")]),
            )
            .with_body(
                "https://api.example.com/users/bob/repos",
                &to_json(&vec![
                    repository(2, bob.clone(), "r2"),
                    repository(1, acme.clone(), "r1"),
                ]),
            )
    }

    #[tokio::test]
    async fn test_discover_merges_and_dedups() {
        let source = acme_source();
        let discovery = discover(&source, ORG_URL, &Cancellation::never())
            .await
            .unwrap();

        assert_eq!(discovery.organization.login, "acme");
        assert_eq!(discovery.members.len(), 1);
        assert!(discovery.failures.is_empty());

        let names: Vec<&str> = discovery
            .repositories
            .iter()
            .map(|r| r.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["acme/r1", "bob/r2"]);

        // Members URL is fetched normalized, and fetches happen in order.
        assert_eq!(
            source.requested(),
            vec![
                ORG_URL.to_string(),
                "https://api.example.com/orgs/acme/members".to_string(),
                "https://api.example.com/orgs/acme/repos".to_string(),
                "https://api.example.com/users/bob/repos".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_members_yield_empty_list() {
        let acme = user("acme", 100, "Organization");
        let source = FakeSource::new()
            .with_body(ORG_URL, &to_json(&organization("acme")))
            .with_body("https://api.example.com/orgs/acme/members", r#"{"message":"oops"}"#)
            .with_body(
                "https://api.example.com/orgs/acme/repos",
                &to_json(&vec![repository(1, acme, "r1")]),
            );

        let discovery = discover(&source, ORG_URL, &Cancellation::never())
            .await
            .unwrap();

        assert!(discovery.members.is_empty());
        assert!(discovery.failures.is_empty());
        assert_eq!(discovery.repositories.len(), 1);
    }

    #[tokio::test]
    async fn test_members_403_is_recorded_not_fatal() {
        let acme = user("acme", 100, "Organization");
        let source = FakeSource::new()
            .with_body(ORG_URL, &to_json(&organization("acme")))
            .with_reply("https://api.example.com/orgs/acme/members", Reply::Forbidden)
            .with_body(
                "https://api.example.com/orgs/acme/repos",
                &to_json(&vec![repository(1, acme, "r1")]),
            );

        let discovery = discover(&source, ORG_URL, &Cancellation::never())
            .await
            .unwrap();

        assert_eq!(discovery.repositories.len(), 1);
        assert_eq!(discovery.failures.len(), 1);
        assert_eq!(discovery.failures[0].subject, "members of acme");
        assert!(discovery.failures[0].error.is_rate_limited_or_unauthorized());
    }

    #[tokio::test]
    async fn test_failed_member_listing_keeps_the_rest() {
        let source = acme_source().with_reply(
            "https://api.example.com/users/bob/repos",
            Reply::Status(500),
        );

        let discovery = discover(&source, ORG_URL, &Cancellation::never())
            .await
            .unwrap();

        assert_eq!(discovery.repositories.len(), 1);
        assert_eq!(discovery.failures.len(), 1);
        assert_eq!(discovery.failures[0].subject, "repositories of bob");
    }

    #[tokio::test]
    async fn test_organization_failure_is_fatal() {
        let source = FakeSource::new().with_reply(ORG_URL, Reply::Forbidden);
        let err = discover(&source, ORG_URL, &Cancellation::never())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconError::Api(ApiError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_unusable_members_url() {
        let mut org = organization("acme");
        org.members_url = "{/member}".to_string();
        let err = org.members(&FakeSource::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::UnusableUrl { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (handle, cancel) = crate::pipeline::cancellation();
        handle.cancel();
        let source = acme_source();
        let err = discover(&source, ORG_URL, &cancel).await.unwrap_err();
        assert!(matches!(err, ReconError::Cancelled));
    }
}
