//! Test synthesis: proposals, test-file locations, skeletons and the
//! collaborator-facing renderings.

pub mod file;
pub mod proposal;
pub mod render;
pub mod skeleton;
pub mod synthesizer;

use serde::{Deserialize, Serialize};

use crate::detectors::fingerprint::SourceFingerprint;

pub use file::{suggest_test_files, TestFileSuggestion};
pub use proposal::{Priority, ProposalType, TestCaseProposal};
pub use skeleton::{generate_skeletons, TestSkeleton};
pub use synthesizer::{dedupe_proposals, synthesize};

/// A changed file whose structure was extracted successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedFile {
    pub path: String,
    pub fingerprint: SourceFingerprint,
}
