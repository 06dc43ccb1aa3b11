// src/detectors/fingerprint.rs
//
// Structural summary of one source file.

use serde::{Deserialize, Serialize};

use super::language::SourceLanguage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub name: String,
    /// Methods, fields or variants, in declaration order.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callable {
    pub name: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClassification {
    Test,
    Api,
    Model,
    View,
    Unknown,
}

/// Everything the synthesizer knows about a file.
///
/// Built once by [`crate::extract_structure`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub language: SourceLanguage,
    pub declared_types: Vec<DeclaredType>,
    pub callables: Vec<Callable>,
    pub imports: Vec<String>,
    pub api_endpoints: Vec<String>,
    pub persistence_operations: Vec<String>,
    pub file_classification: FileClassification,
}

impl SourceFingerprint {
    pub fn type_names(&self) -> Vec<String> {
        self.declared_types.iter().map(|t| t.name.clone()).collect()
    }

    pub fn callable_names(&self) -> Vec<String> {
        self.callables.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of placeholder tests a skeleton for this file carries.
    pub fn placeholder_count(&self) -> usize {
        self.callables.len()
            + self
                .declared_types
                .iter()
                .map(|t| t.members.len())
                .sum::<usize>()
    }

    pub fn is_structurally_empty(&self) -> bool {
        self.declared_types.is_empty()
            && self.callables.is_empty()
            && self.imports.is_empty()
            && self.api_endpoints.is_empty()
            && self.persistence_operations.is_empty()
    }
}
