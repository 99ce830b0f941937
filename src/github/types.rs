// src/github/types.rs
// =============================================================================
// The three GitHub resources recon works with, decoded field-for-field from
// the REST API JSON. Only the fields the pipeline needs are kept; serde
// ignores the rest of the (large) GitHub payloads.
// =============================================================================

use serde::{Deserialize, Serialize};

/// `owner.type` value GitHub uses for organization accounts.
pub const ORGANIZATION_ACCOUNT_TYPE: &str = "Organization";

/// A GitHub account: a member of the organization, or a repository owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub id: u64,
    /// "User" or "Organization"
    #[serde(rename = "type")]
    pub account_type: String,
    /// Templated list URL, e.g. `https://api.github.com/users/bob/repos`
    #[serde(rename = "repos_url")]
    pub repositories_url: String,
}

impl User {
    pub fn is_organization(&self) -> bool {
        self.account_type == ORGANIZATION_ACCOUNT_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: u64,
    pub login: String,
    #[serde(rename = "repos_url")]
    pub repositories_url: String,
    /// Comes back templated: `.../orgs/acme/members{/member}`
    pub members_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub owner: User,
    pub name: String,
    pub full_name: String,
    pub clone_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_repository_ignores_extra_fields() {
        let json = r#"{
            "id": 42,
            "node_id": "R_kgDO",
            "name": "r1",
            "full_name": "acme/r1",
            "private": false,
            "owner": {
                "login": "acme",
                "id": 7,
                "type": "Organization",
                "repos_url": "https://api.github.com/users/acme/repos",
                "site_admin": false
            },
            "clone_url": "https://github.com/acme/r1.git"
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.id, 42);
        assert_eq!(repo.full_name, "acme/r1");
        assert_eq!(repo.owner.account_type, "Organization");
        assert!(repo.owner.is_organization());
        assert_eq!(repo.clone_url, "https://github.com/acme/r1.git");
    }

    #[test]
    fn test_decode_organization() {
        let json = r#"{
            "login": "acme",
            "id": 7,
            "repos_url": "https://api.github.com/orgs/acme/repos",
            "members_url": "https://api.github.com/orgs/acme/members{/member}",
            "description": "ACME Corp"
        }"#;
        let org: Organization = serde_json::from_str(json).unwrap();
        assert_eq!(org.login, "acme");
        assert_eq!(org.repositories_url, "https://api.github.com/orgs/acme/repos");
        assert!(org.members_url.ends_with("{/member}"));
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let json = r#"{"login": "bob", "id": 1, "type": "User"}"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }
}
