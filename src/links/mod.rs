//! Change-link extraction.
//!
//! Recovers the pull requests, branches and commits behind a ticket from
//! free text and from the tracker's development-info payload. Every
//! detector runs on its own and results are concatenated; callers that
//! want one entry per change run [`merge_references`] afterwards.
//!
//! Nothing here fails. No signal is an empty list.

pub mod host;
pub mod patterns;
pub mod payload;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use patterns::FreeTextDetector;
pub use payload::{
    BranchNameDetector, CommitMessageDetector, DevStatusDetector, DevelopmentFieldDetector,
    DevelopmentPayload, FieldScanDetector,
};

/* ============================================================
   Data model
   ============================================================ */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    PullRequest,
    Branch,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSignal {
    DevStatusApi,
    DevelopmentField,
    FreeTextPattern,
    BranchNameMatch,
    CommitMessageMatch,
}

impl SourceSignal {
    /// How much a reference found through this signal can be trusted.
    pub fn confidence(self) -> f64 {
        match self {
            Self::DevStatusApi => 1.0,
            Self::DevelopmentField => 0.9,
            Self::BranchNameMatch => 0.7,
            Self::CommitMessageMatch => 0.6,
            Self::FreeTextPattern => 0.5,
        }
    }
}

impl fmt::Display for SourceSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DevStatusApi => "dev_status_api",
            Self::DevelopmentField => "development_field",
            Self::FreeTextPattern => "free_text_pattern",
            Self::BranchNameMatch => "branch_name_match",
            Self::CommitMessageMatch => "commit_message_match",
        };
        f.write_str(s)
    }
}

/// A pull request, branch or commit believed to implement a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReference {
    pub kind: ChangeKind,
    pub identifier: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub repository: Option<String>,
    pub status: Option<String>,
    pub source_branch: Option<String>,
    /// Never empty. The first entry is the signal that produced it.
    pub signals: Vec<SourceSignal>,
}

impl ChangeReference {
    pub fn new(kind: ChangeKind, identifier: impl Into<String>, signal: SourceSignal) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            url: None,
            title: None,
            repository: None,
            status: None,
            source_branch: None,
            signals: vec![signal],
        }
    }

    pub fn source_signal(&self) -> SourceSignal {
        self.signals
            .first()
            .copied()
            .unwrap_or(SourceSignal::FreeTextPattern)
    }

    pub fn confidence(&self) -> f64 {
        self.signals
            .iter()
            .map(|s| s.confidence())
            .fold(0.0, f64::max)
    }

    /// Identity used by [`merge_references`].
    pub fn identity(&self) -> (ChangeKind, String, Option<String>) {
        (self.kind, self.identifier.clone(), self.repository.clone())
    }

    /// A reference with neither identifier nor URL carries no information.
    pub fn is_usable(&self) -> bool {
        !self.identifier.is_empty() || self.url.is_some()
    }

    fn absorb(&mut self, other: ChangeReference) {
        for s in other.signals {
            if !self.signals.contains(&s) {
                self.signals.push(s);
            }
        }
        self.url = self.url.take().or(other.url);
        self.title = self.title.take().or(other.title);
        self.status = self.status.take().or(other.status);
        self.source_branch = self.source_branch.take().or(other.source_branch);
    }
}

/* ============================================================
   Detector pipeline
   ============================================================ */

/// Everything a detector may look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkInput<'a> {
    pub ticket_key: Option<&'a str>,
    pub text: Option<&'a str>,
    pub payload: Option<&'a DevelopmentPayload>,
    pub base_host_url: Option<&'a str>,
}

pub trait ChangeDetector: Send + Sync {
    fn signal(&self) -> SourceSignal;
    fn detect(&self, input: &LinkInput) -> Vec<ChangeReference>;
}

pub struct LinkPipeline {
    detectors: Vec<Box<dyn ChangeDetector>>,
}

impl Default for LinkPipeline {
    fn default() -> Self {
        Self {
            detectors: vec![
                Box::new(DevStatusDetector),
                Box::new(DevelopmentFieldDetector),
                Box::new(FieldScanDetector),
                Box::new(BranchNameDetector),
                Box::new(CommitMessageDetector),
                Box::new(FreeTextDetector),
            ],
        }
    }
}

impl LinkPipeline {
    pub fn new(detectors: Vec<Box<dyn ChangeDetector>>) -> Self {
        Self { detectors }
    }

    /// Concatenated output of every detector, in pipeline order.
    pub fn run(&self, input: &LinkInput) -> Vec<ChangeReference> {
        let mut out = Vec::new();

        for detector in &self.detectors {
            let found: Vec<ChangeReference> = detector
                .detect(input)
                .into_iter()
                .filter(ChangeReference::is_usable)
                .collect();
            debug!(signal = %detector.signal(), count = found.len(), "detector finished");
            out.extend(found);
        }

        if !out.is_empty() {
            info!(count = out.len(), "change references found");
        }
        out
    }
}

/* ============================================================
   Entry points
   ============================================================ */

pub fn extract_from_text(text: &str, base_host_url: &str) -> Vec<ChangeReference> {
    FreeTextDetector.detect(&LinkInput {
        text: Some(text),
        base_host_url: Some(base_host_url),
        ..LinkInput::default()
    })
}

pub fn extract_from_development_payload(
    ticket_key: &str,
    payload: &DevelopmentPayload,
    base_host_url: Option<&str>,
) -> Vec<ChangeReference> {
    let pipeline = LinkPipeline::new(vec![
        Box::new(DevStatusDetector),
        Box::new(DevelopmentFieldDetector),
        Box::new(FieldScanDetector),
        Box::new(BranchNameDetector),
        Box::new(CommitMessageDetector),
    ]);

    pipeline.run(&LinkInput {
        ticket_key: Some(ticket_key),
        payload: Some(payload),
        base_host_url,
        ..LinkInput::default()
    })
}

/// Collapse references sharing `(kind, identifier, repository)`.
///
/// The first occurrence keeps its position; later duplicates contribute
/// their signals and fill any field the first one lacks.
pub fn merge_references(refs: Vec<ChangeReference>) -> Vec<ChangeReference> {
    let mut out: Vec<ChangeReference> = Vec::new();
    let mut index: HashMap<(ChangeKind, String, Option<String>), usize> = HashMap::new();

    for r in refs {
        match index.get(&r.identity()) {
            Some(&i) => out[i].absorb(r),
            None => {
                index.insert(r.identity(), out.len());
                out.push(r);
            }
        }
    }

    out
}
