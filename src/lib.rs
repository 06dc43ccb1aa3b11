//! ticketgrep
//!
//! Links a tracker ticket to the pull requests, branches and commits that
//! implement it, and turns the ticket text plus the changed source into
//! test-case proposals, test-file suggestions and skeleton tests.
//!
//! The core does no I/O. Callers hand in ticket records, file contents and
//! development payloads that are already fetched.

pub mod config;
pub mod detectors;
pub mod error;
pub mod generator;
pub mod links;
pub mod logger;
pub mod testgen;
pub mod ticket;

pub use config::GeneratorConfig;
pub use detectors::extract_structure;
pub use detectors::fingerprint::SourceFingerprint;
pub use error::{ConfigError, InputValidationError, ParseError};
pub use generator::{
    generate_test_artifacts, ChangedFile, FileDiagnostic, TestArtifacts, TestCaseGenerator,
};
pub use links::{ChangeReference, DevelopmentPayload};
pub use ticket::Ticket;
