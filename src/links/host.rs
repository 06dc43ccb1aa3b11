//! links/host.rs
//!
//! Known code-hosting conventions: canonical pull-request URLs and
//! repository names recovered from absolute URLs.

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostConvention {
    GitHub,
    Bitbucket,
    AzureDevOps,
    GitLab,
}

impl HostConvention {
    pub fn detect(base_url: &str) -> Option<Self> {
        let parsed = Url::parse(base_url.trim()).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        Self::from_host(&host)
    }

    fn from_host(host: &str) -> Option<Self> {
        let is = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

        if is("github.com") {
            Some(Self::GitHub)
        } else if is("bitbucket.org") {
            Some(Self::Bitbucket)
        } else if is("dev.azure.com") || host.ends_with(".visualstudio.com") {
            Some(Self::AzureDevOps)
        } else if is("gitlab.com") {
            Some(Self::GitLab)
        } else {
            None
        }
    }

    fn pull_request_path(self, number: &str) -> String {
        match self {
            Self::GitHub => format!("pull/{number}"),
            Self::Bitbucket => format!("pull-requests/{number}"),
            Self::AzureDevOps => format!("pullrequest/{number}"),
            Self::GitLab => format!("-/merge_requests/{number}"),
        }
    }
}

/// Canonical PR URL under `base_url`, when the host is a known convention.
pub fn pull_request_url(base_url: &str, number: &str) -> Option<String> {
    let convention = HostConvention::detect(base_url)?;
    let base = base_url.trim().trim_end_matches('/');
    Some(format!("{base}/{}", convention.pull_request_path(number)))
}

/// `owner/repo` (or the host's equivalent) from an absolute change URL.
pub fn repository_from_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let convention = HostConvention::from_host(&parsed.host_str()?.to_ascii_lowercase())?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();

    let parts: Vec<&str> = match convention {
        HostConvention::GitHub | HostConvention::Bitbucket => {
            segments.iter().take(2).copied().collect()
        }
        HostConvention::AzureDevOps => {
            let git = segments.iter().position(|s| *s == "_git")?;
            let mut p: Vec<&str> = segments[..git].to_vec();
            p.push(*segments.get(git + 1)?);
            p
        }
        HostConvention::GitLab => segments.iter().take_while(|s| **s != "-").copied().collect(),
    };

    if parts.len() < 2 {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_hosts() {
        let cases = [
            ("https://github.com/acme/shop", HostConvention::GitHub),
            ("https://bitbucket.org", HostConvention::Bitbucket),
            ("https://dev.azure.com/acme", HostConvention::AzureDevOps),
            ("https://gitlab.com/grp", HostConvention::GitLab),
        ];
        for (url, expected) in cases {
            assert_eq!(HostConvention::detect(url), Some(expected), "{url}");
        }
        assert_eq!(HostConvention::detect("https://acme.atlassian.net"), None);
        assert_eq!(HostConvention::detect("not a url"), None);
    }

    #[test]
    fn builds_canonical_urls() {
        assert_eq!(
            pull_request_url("https://github.com/acme/shop/", "7").as_deref(),
            Some("https://github.com/acme/shop/pull/7")
        );
        assert_eq!(
            pull_request_url("https://bitbucket.org/acme/shop", "7").as_deref(),
            Some("https://bitbucket.org/acme/shop/pull-requests/7")
        );
        assert_eq!(pull_request_url("https://jira.acme.io", "7"), None);
    }

    #[test]
    fn repository_names() {
        assert_eq!(
            repository_from_url("https://github.com/acme/shop/pull/7").as_deref(),
            Some("acme/shop")
        );
        assert_eq!(
            repository_from_url("https://dev.azure.com/acme/retail/_git/shop/pullrequest/9")
                .as_deref(),
            Some("acme/retail/shop")
        );
        assert_eq!(
            repository_from_url("https://gitlab.com/acme/team/shop/-/merge_requests/3").as_deref(),
            Some("acme/team/shop")
        );
        assert_eq!(repository_from_url("https://example.com/a/b"), None);
    }
}
