//! links/payload.rs
//!
//! Development-info payload as the tracker reports it, and the detectors
//! that read it. Every field is optional; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::patterns::scan_text;
use super::{ChangeDetector, ChangeKind, ChangeReference, LinkInput, SourceSignal};

/* ============================================================
   Wire shape
   ============================================================ */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentPayload {
    /// Dev-status API response.
    #[serde(default)]
    pub dev_status: Option<DevStatus>,
    /// Development custom field.
    #[serde(default)]
    pub development_field: Option<DevelopmentField>,
    /// Raw values of any other development-ish fields.
    #[serde(default)]
    pub custom_fields: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevStatus {
    #[serde(default)]
    pub detail: Vec<RepositoryDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequestEntry>,
    #[serde(default)]
    pub branches: Vec<BranchEntry>,
    #[serde(default)]
    pub commits: Vec<CommitEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentField {
    #[serde(default)]
    pub pull_requests: Vec<PullRequestEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestEntry {
    /// `"#42"`, `"42"` or `42` depending on the integration.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<PullRequestSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestSource {
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<Value>,
}

impl DevelopmentPayload {
    fn repositories(&self) -> &[RepositoryDetail] {
        self.dev_status
            .as_ref()
            .map(|d| d.detail.as_slice())
            .unwrap_or(&[])
    }
}

/* ============================================================
   Detectors
   ============================================================ */

pub struct DevStatusDetector;

impl ChangeDetector for DevStatusDetector {
    fn signal(&self) -> SourceSignal {
        SourceSignal::DevStatusApi
    }

    fn detect(&self, input: &LinkInput) -> Vec<ChangeReference> {
        let Some(payload) = input.payload else {
            return Vec::new();
        };

        payload
            .repositories()
            .iter()
            .flat_map(|repo| {
                repo.pull_requests
                    .iter()
                    .map(move |pr| pull_request(pr, repo.name.as_deref(), self.signal()))
            })
            .collect()
    }
}

pub struct DevelopmentFieldDetector;

impl ChangeDetector for DevelopmentFieldDetector {
    fn signal(&self) -> SourceSignal {
        SourceSignal::DevelopmentField
    }

    fn detect(&self, input: &LinkInput) -> Vec<ChangeReference> {
        let Some(field) = input.payload.and_then(|p| p.development_field.as_ref()) else {
            return Vec::new();
        };

        field
            .pull_requests
            .iter()
            .map(|pr| pull_request(pr, None, self.signal()))
            .collect()
    }
}

/// Stringifies each raw custom field and runs the free-text patterns on it.
pub struct FieldScanDetector;

impl ChangeDetector for FieldScanDetector {
    fn signal(&self) -> SourceSignal {
        SourceSignal::FreeTextPattern
    }

    fn detect(&self, input: &LinkInput) -> Vec<ChangeReference> {
        let Some(payload) = input.payload else {
            return Vec::new();
        };

        payload
            .custom_fields
            .iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) | Value::Array(_) => Some(value.to_string()),
                _ => None,
            })
            .flat_map(|text| scan_text(&text, input.base_host_url))
            .collect()
    }
}

pub struct BranchNameDetector;

impl ChangeDetector for BranchNameDetector {
    fn signal(&self) -> SourceSignal {
        SourceSignal::BranchNameMatch
    }

    fn detect(&self, input: &LinkInput) -> Vec<ChangeReference> {
        let (Some(payload), Some(key)) = (input.payload, input.ticket_key) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for repo in payload.repositories() {
            for branch in &repo.branches {
                let name = branch.name.as_deref().unwrap_or_default();
                if !contains_key(name, key) {
                    continue;
                }
                let mut r = ChangeReference::new(ChangeKind::Branch, name, self.signal());
                r.url = branch.url.clone();
                r.status = branch.status.clone();
                r.repository = repo.name.clone();
                out.push(r);
            }
        }
        out
    }
}

pub struct CommitMessageDetector;

impl ChangeDetector for CommitMessageDetector {
    fn signal(&self) -> SourceSignal {
        SourceSignal::CommitMessageMatch
    }

    fn detect(&self, input: &LinkInput) -> Vec<ChangeReference> {
        let (Some(payload), Some(key)) = (input.payload, input.ticket_key) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for repo in payload.repositories() {
            for commit in &repo.commits {
                let message = commit.message.as_deref().unwrap_or_default();
                if !contains_key(message, key) {
                    continue;
                }
                let id = commit.id.clone().unwrap_or_default();
                let mut r = ChangeReference::new(ChangeKind::Commit, id, self.signal());
                r.url = commit.url.clone();
                r.title = message.lines().next().map(str::to_owned);
                r.repository = repo.name.clone();
                out.push(r);
            }
        }
        out
    }
}

/* ============================================================
   Helpers
   ============================================================ */

fn pull_request(
    pr: &PullRequestEntry,
    repository: Option<&str>,
    signal: SourceSignal,
) -> ChangeReference {
    let identifier = pr_identifier(pr.id.as_ref());
    let mut r = ChangeReference::new(ChangeKind::PullRequest, identifier, signal);
    r.url = pr.url.clone();
    r.title = pr.name.clone();
    r.status = pr.status.clone();
    r.repository = repository.map(str::to_owned);
    r.source_branch = pr.source.as_ref().and_then(|s| s.branch.clone());
    r
}

fn pr_identifier(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.trim().trim_start_matches('#').to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn contains_key(haystack: &str, key: &str) -> bool {
    !key.is_empty() && haystack.to_lowercase().contains(&key.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> DevelopmentPayload {
        serde_json::from_value(json!({
            "devStatus": {
                "detail": [{
                    "name": "acme/shop",
                    "pullRequests": [
                        { "id": "#42", "url": "https://github.com/acme/shop/pull/42",
                          "status": "OPEN", "name": "SHOP-7 login",
                          "source": { "branch": "feature/SHOP-7" } }
                    ],
                    "branches": [
                        { "name": "feature/shop-7-login",
                          "url": "https://github.com/acme/shop/tree/feature/shop-7-login" },
                        { "name": "main" }
                    ],
                    "commits": [
                        { "id": "abc1234", "message": "SHOP-7: add login form\n\nbody",
                          "url": "https://github.com/acme/shop/commit/abc1234" },
                        { "id": "def5678", "message": "unrelated" }
                    ]
                }]
            },
            "developmentField": {
                "pullRequests": [ { "id": 42, "url": "https://github.com/acme/shop/pull/42" } ]
            },
            "customFields": [
                "{pullrequest={dataType=pullrequest, state=OPEN, stateCount=1}} PR #42",
                7
            ]
        }))
        .unwrap()
    }

    fn input<'a>(p: &'a DevelopmentPayload) -> LinkInput<'a> {
        LinkInput {
            ticket_key: Some("SHOP-7"),
            payload: Some(p),
            base_host_url: Some("https://github.com/acme/shop"),
            ..LinkInput::default()
        }
    }

    #[test]
    fn dev_status_pull_requests() {
        let p = payload();
        let refs = DevStatusDetector.detect(&input(&p));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].identifier, "42");
        assert_eq!(refs[0].repository.as_deref(), Some("acme/shop"));
        assert_eq!(refs[0].source_branch.as_deref(), Some("feature/SHOP-7"));
        assert_eq!(refs[0].status.as_deref(), Some("OPEN"));
    }

    #[test]
    fn numeric_ids_from_development_field() {
        let p = payload();
        let refs = DevelopmentFieldDetector.detect(&input(&p));
        assert_eq!(refs[0].identifier, "42");
        assert_eq!(refs[0].source_signal(), SourceSignal::DevelopmentField);
    }

    #[test]
    fn branches_and_commits_match_key_case_insensitively() {
        let p = payload();
        let branches = BranchNameDetector.detect(&input(&p));
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].identifier, "feature/shop-7-login");

        let commits = CommitMessageDetector.detect(&input(&p));
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].identifier, "abc1234");
        assert_eq!(commits[0].title.as_deref(), Some("SHOP-7: add login form"));
    }

    #[test]
    fn field_scan_uses_text_patterns() {
        let p = payload();
        let refs = FieldScanDetector.detect(&input(&p));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].url.as_deref(), Some("https://github.com/acme/shop/pull/42"));
    }

    #[test]
    fn no_key_means_no_branch_or_commit_matches() {
        let p = payload();
        let mut i = input(&p);
        i.ticket_key = None;
        assert!(BranchNameDetector.detect(&i).is_empty());
        assert!(CommitMessageDetector.detect(&i).is_empty());
    }
}
