//! links/patterns.rs
//!
//! Free-text change references: PR URLs for the known hosts, bare PR
//! mentions, and GitHub compare/commit URLs.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::host::{pull_request_url, repository_from_url};
use super::{ChangeDetector, ChangeKind, ChangeReference, LinkInput, SourceSignal};

struct TextPattern {
    kind: ChangeKind,
    re: Regex,
}

/// Applied in this order; every pattern runs.
static PATTERNS: LazyLock<Vec<TextPattern>> = LazyLock::new(|| {
    let pr = |p: &str| (ChangeKind::PullRequest, p.to_string());
    [
        // host-specific absolute URLs
        pr(r"https?://github\.com/[^/\s]+/[^/\s]+/pull/(\d+)"),
        pr(r"https?://bitbucket\.org/[^/\s]+/[^/\s]+/pull-requests/(\d+)"),
        pr(r"https?://dev\.azure\.com/[^/\s]+/[^/\s]+/_git/[^/\s]+/pullrequest/(\d+)"),
        pr(r"https?://gitlab\.com/\S+?/-/merge_requests/(\d+)"),
        // bare mentions
        pr(r"\bPR[:\s#]+(\d+)"),
        pr(r"[Pp]ull [Rr]equest[:\s#]+(\d+)"),
        pr(r"pull/(\d+)"),
        pr(r"\bPR-(\d+)"),
        pr(r"_git/[^/\s]+/pullrequest/(\d+)"),
        pr(r"/pull-requests?/(\d+)"),
        pr(r"pullrequest=(\d+)"),
        (
            ChangeKind::Branch,
            r"https?://github\.com/[^/\s]+/[^/\s]+/compare/([^\s?#]+)".to_string(),
        ),
        (
            ChangeKind::Commit,
            r"https?://github\.com/[^/\s]+/[^/\s]+/commits?/([0-9a-fA-F]{7,40})\b".to_string(),
        ),
    ]
    .into_iter()
    .map(|(kind, p)| TextPattern {
        kind,
        re: Regex::new(&p).expect("change reference pattern"),
    })
    .collect()
});

pub struct FreeTextDetector;

impl ChangeDetector for FreeTextDetector {
    fn signal(&self) -> SourceSignal {
        SourceSignal::FreeTextPattern
    }

    fn detect(&self, input: &LinkInput) -> Vec<ChangeReference> {
        match input.text {
            Some(text) => scan_text(text, input.base_host_url),
            None => Vec::new(),
        }
    }
}

/// Run every pattern over `text`.
///
/// A relative match sitting inside any absolute URL match is the same
/// reference and is skipped. Results are unique by `(identifier, url)`.
/// Bare mentions turned into URLs take their repository from the base.
pub fn scan_text(text: &str, base_host_url: Option<&str>) -> Vec<ChangeReference> {
    let mut out = Vec::new();
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut absolute_spans: Vec<(usize, usize)> = Vec::new();

    for pattern in PATTERNS.iter() {
        for caps in pattern.re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let identifier = caps
                .get(1)
                .map(|m| m.as_str().trim_end_matches(['.', ',', ')']).to_string())
                .unwrap_or_default();
            let matched = whole.as_str();
            let absolute = matched.starts_with("http");

            if !absolute
                && absolute_spans
                    .iter()
                    .any(|&(s, e)| whole.start() >= s && whole.end() <= e)
            {
                continue;
            }

            if absolute {
                absolute_spans.push((whole.start(), whole.end()));
            }

            let url = if absolute {
                Some(matched.trim_end_matches(['.', ',', ')']).to_string())
            } else if pattern.kind == ChangeKind::PullRequest && !identifier.is_empty() {
                base_host_url.and_then(|base| pull_request_url(base, &identifier))
            } else {
                None
            };

            if identifier.is_empty() && url.is_none() {
                continue;
            }

            if !seen.insert((identifier.clone(), url.clone())) {
                continue;
            }

            debug!(pattern = pattern.re.as_str(), %identifier, "text reference");

            let mut reference =
                ChangeReference::new(pattern.kind, identifier, SourceSignal::FreeTextPattern);
            reference.repository = if absolute {
                url.as_deref().and_then(repository_from_url)
            } else if url.is_some() {
                base_host_url.and_then(repository_from_url)
            } else {
                None
            };
            reference.url = url;
            out.push(reference);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitbucket_url_yields_one_reference() {
        let refs = scan_text(
            "See https://bitbucket.org/org/repo/pull-requests/42 for details",
            Some("https://bitbucket.org"),
        );
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, ChangeKind::PullRequest);
        assert_eq!(refs[0].identifier, "42");
        assert_eq!(
            refs[0].url.as_deref(),
            Some("https://bitbucket.org/org/repo/pull-requests/42")
        );
        assert_eq!(refs[0].repository.as_deref(), Some("org/repo"));
    }

    #[test]
    fn bare_mentions_get_synthesized_urls() {
        let refs = scan_text(
            "Fixed in PR #17, see also pull request 18.",
            Some("https://github.com/acme/shop"),
        );
        let urls: Vec<_> = refs.iter().map(|r| r.url.as_deref().unwrap()).collect();
        assert_eq!(
            urls,
            vec![
                "https://github.com/acme/shop/pull/17",
                "https://github.com/acme/shop/pull/18",
            ]
        );
    }

    #[test]
    fn repeated_url_is_one_reference() {
        let refs = scan_text(
            "Fixed in https://github.com/acme/shop/pull/3. \
             Reviewed https://github.com/acme/shop/pull/3 again",
            Some("https://github.com/other/repo"),
        );
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].url.as_deref(), Some("https://github.com/acme/shop/pull/3"));
        assert_eq!(refs[0].repository.as_deref(), Some("acme/shop"));
    }

    #[test]
    fn bare_mention_takes_repository_from_base() {
        let refs = scan_text("merged in PR #12", Some("https://github.com/acme/shop/"));
        assert_eq!(refs[0].repository.as_deref(), Some("acme/shop"));

        let refs = scan_text("merged in PR #12", Some("https://bitbucket.org"));
        assert_eq!(refs[0].url.as_deref(), Some("https://bitbucket.org/pull-requests/12"));
        assert!(refs[0].repository.is_none());
    }

    #[test]
    fn unknown_host_keeps_identifier_without_url() {
        let refs = scan_text("merged as PR-5", Some("https://jira.acme.io"));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].identifier, "5");
        assert!(refs[0].url.is_none());
    }

    #[test]
    fn all_patterns_contribute() {
        let text = "https://github.com/acme/shop/pull/3 and \
                    https://dev.azure.com/acme/retail/_git/shop/pullrequest/9 and \
                    https://github.com/acme/shop/commit/0a1b2c3d4e and \
                    https://github.com/acme/shop/compare/feature-x";
        let refs = scan_text(text, None);
        let kinds: Vec<_> = refs.iter().map(|r| (r.kind, r.identifier.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::PullRequest, "3"),
                (ChangeKind::PullRequest, "9"),
                (ChangeKind::Branch, "feature-x"),
                (ChangeKind::Commit, "0a1b2c3d4e"),
            ]
        );
    }

    #[test]
    fn no_matches_is_empty() {
        assert!(scan_text("nothing to see here", Some("https://github.com")).is_empty());
    }
}
