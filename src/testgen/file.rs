// src/testgen/file.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::testgen::AnalyzedFile;

/// Where a test for `source_file` should live and what it should cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFileSuggestion {
    pub source_file: String,
    pub suggested_test_file: String,
    pub types_to_test: Vec<String>,
    pub callables_to_test: Vec<String>,
}

/* ============================================================
   Public API
   ============================================================ */

/// One suggestion per analysed file, in input order.
///
/// Files that failed extraction never reach this point, so they are
/// simply absent from the output.
pub fn suggest_test_files(files: &[AnalyzedFile], prefix: &str) -> Vec<TestFileSuggestion> {
    files
        .iter()
        .map(|f| TestFileSuggestion {
            source_file: f.path.clone(),
            suggested_test_file: test_file_path(&f.path, prefix),
            types_to_test: f.fingerprint.type_names(),
            callables_to_test: f.fingerprint.callable_names(),
        })
        .collect()
}

/// `dir/name.ext` becomes `dir/<prefix>name.ext`.
pub fn test_file_path(source: &str, prefix: &str) -> String {
    let path = Path::new(source);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());
    let test_name = format!("{prefix}{name}");

    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            dir.join(test_name).to_string_lossy().into_owned()
        }
        _ => test_name,
    }
}
