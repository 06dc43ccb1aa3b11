//! generator.rs
//!
//! Ticket-level pipeline: sections, per-file extraction, synthesis.
//!
//! Extraction is independent per file and may fan out over scoped
//! threads. Synthesis waits for every file, so a skipped file changes
//! which rules fire.

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::detectors::extract_structure;
use crate::detectors::fingerprint::SourceFingerprint;
use crate::error::{InputValidationError, ParseError};
use crate::links::{merge_references, ChangeReference, DevelopmentPayload, LinkInput, LinkPipeline};
use crate::testgen::render::{test_case_payload, TestCasePayload};
use crate::testgen::{
    generate_skeletons, suggest_test_files, synthesize, AnalyzedFile, TestCaseProposal,
    TestFileSuggestion, TestSkeleton,
};
use crate::ticket::{CodeMentions, Ticket, TicketSections};

/// Source already loaded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub content: String,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A changed file that contributed nothing, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostic {
    pub path: String,
    pub reason: String,
}

impl From<&ParseError> for FileDiagnostic {
    fn from(err: &ParseError) -> Self {
        Self {
            path: err.path().to_string(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestArtifacts {
    pub sections: TicketSections,
    pub mentions: CodeMentions,
    pub proposals: Vec<TestCaseProposal>,
    pub file_suggestions: Vec<TestFileSuggestion>,
    pub skeletons: Vec<TestSkeleton>,
    pub diagnostics: Vec<FileDiagnostic>,
}

pub struct TestCaseGenerator {
    config: GeneratorConfig,
}

impl TestCaseGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(
        &self,
        ticket: &Ticket,
        files: &[ChangedFile],
    ) -> Result<TestArtifacts, InputValidationError> {
        ticket.validate()?;

        let description = ticket.description();
        let sections = TicketSections::parse(description);
        let mentions = CodeMentions::extract(description);

        let mut analyzed = Vec::with_capacity(files.len());
        let mut diagnostics = Vec::new();

        for (file, result) in files.iter().zip(self.extract_all(files)) {
            match result {
                Ok(fingerprint) => analyzed.push(AnalyzedFile {
                    path: file.path.clone(),
                    fingerprint,
                }),
                Err(err) => {
                    warn!(path = %file.path, error = %err, "skipping file");
                    diagnostics.push(FileDiagnostic::from(&err));
                }
            }
        }

        let fingerprints: Vec<SourceFingerprint> =
            analyzed.iter().map(|a| a.fingerprint.clone()).collect();
        let proposals = synthesize(&fingerprints, &sections);
        let file_suggestions = suggest_test_files(&analyzed, &self.config.test_file_prefix);
        let skeletons = generate_skeletons(&analyzed);

        info!(
            ticket = ticket.key.as_deref().unwrap_or("-"),
            files = files.len(),
            analyzed = analyzed.len(),
            skipped = diagnostics.len(),
            proposals = proposals.len(),
            "generated test artifacts"
        );

        Ok(TestArtifacts {
            sections,
            mentions,
            proposals,
            file_suggestions,
            skeletons,
            diagnostics,
        })
    }

    /// Results come back in input order regardless of thread scheduling.
    fn extract_all(&self, files: &[ChangedFile]) -> Vec<Result<SourceFingerprint, ParseError>> {
        if !self.config.parallel_extraction || files.len() < 2 {
            return files.iter().map(extract_one).collect();
        }

        thread::scope(|scope| {
            let handles: Vec<_> = files
                .iter()
                .map(|f| scope.spawn(move || extract_one(f)))
                .collect();

            handles
                .into_iter()
                .zip(files)
                .map(|(handle, f)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(ParseError::Grammar {
                            path: f.path.clone(),
                            reason: "extraction thread panicked".into(),
                        })
                    })
                })
                .collect()
        })
    }

    /// Every change reference for the ticket, one entry per change.
    pub fn link_changes(
        &self,
        ticket: &Ticket,
        payload: Option<&DevelopmentPayload>,
    ) -> Vec<ChangeReference> {
        let input = LinkInput {
            ticket_key: ticket.key.as_deref(),
            text: ticket.description.as_deref(),
            payload,
            base_host_url: self.config.base_host_url.as_deref(),
        };
        merge_references(LinkPipeline::default().run(&input))
    }

    /// Test-management request bodies for `proposals`, filed under the
    /// configured section and referencing the ticket key.
    pub fn test_case_payloads(
        &self,
        ticket: &Ticket,
        proposals: &[TestCaseProposal],
    ) -> Vec<TestCasePayload> {
        let refs = ticket.key.as_deref().unwrap_or_default();
        proposals
            .iter()
            .map(|p| test_case_payload(p, self.config.testrail_section_id, refs))
            .collect()
    }
}

fn extract_one(file: &ChangedFile) -> Result<SourceFingerprint, ParseError> {
    debug!(path = %file.path, bytes = file.content.len(), "extracting");
    extract_structure(&file.content, &file.path)
}

/// One-shot form of [`TestCaseGenerator::generate`].
pub fn generate_test_artifacts(
    ticket: &Ticket,
    files: &[ChangedFile],
    config: GeneratorConfig,
) -> Result<TestArtifacts, InputValidationError> {
    TestCaseGenerator::new(config).generate(ticket, files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(description: &str) -> Ticket {
        Ticket {
            key: Some("SHOP-7".into()),
            title: "Login".into(),
            description: Some(description.into()),
            issue_type: "Story".into(),
            status: "Open".into(),
            ..Ticket::default()
        }
    }

    fn files() -> Vec<ChangedFile> {
        vec![
            ChangedFile::new("app/auth.py", "def login(user, password):\n    return True\n"),
            ChangedFile::new("app/broken.py", "def nope(:\n"),
            ChangedFile::new("src/cart.rs", "pub struct Cart { items: Vec<u32> }\n"),
        ]
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let seq = TestCaseGenerator::new(GeneratorConfig {
            parallel_extraction: false,
            ..GeneratorConfig::default()
        });
        let par = TestCaseGenerator::new(GeneratorConfig::default());

        let a = seq.generate(&ticket(""), &files()).unwrap();
        let b = par.generate(&ticket(""), &files()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.diagnostics.len(), 1);
        assert_eq!(a.diagnostics[0].path, "app/broken.py");
        assert_eq!(a.file_suggestions.len(), 2);
        assert_eq!(a.file_suggestions[1].suggested_test_file, "src/test_cart.rs");
    }

    #[test]
    fn invalid_ticket_aborts() {
        let mut t = ticket("");
        t.title.clear();
        let err = TestCaseGenerator::new(GeneratorConfig::default())
            .generate(&t, &files())
            .unwrap_err();
        assert_eq!(err, InputValidationError::MissingField { field: "title" });
    }

    #[test]
    fn link_changes_merges_text_and_payload() {
        let payload: DevelopmentPayload = serde_json::from_value(serde_json::json!({
            "devStatus": { "detail": [{ "name": "acme/shop", "pullRequests": [
                { "id": "12", "url": "https://github.com/acme/shop/pull/12", "name": "Login" }
            ]}]}
        }))
        .unwrap();

        let generator = TestCaseGenerator::new(GeneratorConfig {
            base_host_url: Some("https://github.com/acme/shop".into()),
            ..GeneratorConfig::default()
        });
        let refs = generator.link_changes(
            &ticket("Done in https://github.com/acme/shop/pull/12"),
            Some(&payload),
        );

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].signals.len(), 2);
        assert_eq!(refs[0].confidence(), 1.0);
        assert_eq!(refs[0].title.as_deref(), Some("Login"));
    }

    #[test]
    fn payloads_use_configured_section() {
        let generator = TestCaseGenerator::new(GeneratorConfig {
            testrail_section_id: 99,
            ..GeneratorConfig::default()
        });
        let t = ticket("Acceptance Criteria\n- user can log in");
        let artifacts = generator.generate(&t, &[]).unwrap();
        let bodies = generator.test_case_payloads(&t, &artifacts.proposals);
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].section_id, 99);
        assert_eq!(bodies[0].refs, "SHOP-7");
    }
}
