// src/github/url.rs
// =============================================================================
// Turns the templated list URLs GitHub hands out into fetchable ones.
//
// GitHub returns URLs such as
//   https://api.github.com/orgs/acme/members{/member}
//   https://api.github.com/users/bob/starred{/owner}{/repo}
// We keep the longest `scheme://host(/segment)*` prefix and drop everything
// from the first template brace or query/fragment marker onward.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

// Host: one or more dotted labels followed by an alphabetic TLD.
// Path segments stop at quotes, whitespace, angle brackets, backslash,
// template braces and query/fragment markers.
static URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^https?://([0-9A-Za-z_-]+\.)+[a-z]{2,5}(/[^"'\s<>\\{}?#]+)*"#)
        .expect("URL prefix pattern is valid")
});

/// Returns the usable prefix of `templated`, or an empty string when there is
/// none. Callers treat "" as "no usable URL".
///
/// ```
/// use ghrecon::github::normalize;
/// assert_eq!(
///     normalize("https://api.example.com/orgs/x/repos{/other}"),
///     "https://api.example.com/orgs/x/repos"
/// );
/// assert_eq!(normalize("not a url"), "");
/// ```
pub fn normalize(templated: &str) -> String {
    URL_PREFIX
        .find(templated)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_template_suffix() {
        assert_eq!(
            normalize("https://api.example.com/orgs/x/repos{/other}"),
            "https://api.example.com/orgs/x/repos"
        );
    }

    #[test]
    fn test_members_url() {
        assert_eq!(
            normalize("https://api.github.com/orgs/acme/members{/member}"),
            "https://api.github.com/orgs/acme/members"
        );
    }

    #[test]
    fn test_plain_url_unchanged() {
        assert_eq!(
            normalize("https://api.github.com/users/bob/repos"),
            "https://api.github.com/users/bob/repos"
        );
    }

    #[test]
    fn test_http_scheme_and_multi_label_host() {
        assert_eq!(
            normalize("http://ghe.corp.example.co/api/v3/orgs/acme{?page}"),
            "http://ghe.corp.example.co/api/v3/orgs/acme"
        );
    }

    #[test]
    fn test_query_is_dropped() {
        assert_eq!(
            normalize("https://api.github.com/orgs/acme/repos?per_page=100"),
            "https://api.github.com/orgs/acme/repos"
        );
    }

    #[test]
    fn test_host_only() {
        assert_eq!(normalize("https://api.github.com"), "https://api.github.com");
    }

    #[test]
    fn test_no_usable_prefix() {
        assert_eq!(normalize("not a url"), "");
        assert_eq!(normalize("ftp://example.com/file"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  https://api.github.com/orgs"), "");
    }
}
