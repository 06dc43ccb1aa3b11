//! detectors/classify.rs
//!
//! File role classification from the base name alone.

use std::path::Path;

use super::fingerprint::FileClassification;

/* ============================================================
   Keyword groups (priority order)
   ============================================================ */

const GROUPS: &[(FileClassification, &[&str])] = &[
    (FileClassification::Test, &["test"]),
    (FileClassification::Api, &["api", "endpoint", "route"]),
    (FileClassification::Model, &["model", "schema", "entity"]),
    (FileClassification::View, &["view", "component", "page"]),
];

pub fn classify_file(file: &str) -> FileClassification {
    let base = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_ascii_lowercase();

    GROUPS
        .iter()
        .find(|(_, words)| words.iter().any(|w| base.contains(w)))
        .map(|(class, _)| *class)
        .unwrap_or(FileClassification::Unknown)
}
