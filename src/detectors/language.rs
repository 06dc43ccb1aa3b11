//! detectors/language.rs
//!
//! Grammar selection for a single source file, by extension.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLanguage {
    Python,
    Rust,
}

/* ============================================================
   Public API
   ============================================================ */

pub fn detect_language(file: &str) -> Option<SourceLanguage> {
    match Path::new(file).extension().and_then(|e| e.to_str()) {
        Some("py") | Some("pyi") => Some(SourceLanguage::Python),
        Some("rs") => Some(SourceLanguage::Rust),
        _ => None,
    }
}

pub fn is_supported(file: &str) -> bool {
    detect_language(file).is_some()
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceLanguage::Python => "python",
            SourceLanguage::Rust => "rust",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_picks_grammar() {
        assert_eq!(detect_language("svc/api.py"), Some(SourceLanguage::Python));
        assert_eq!(detect_language("stubs/api.pyi"), Some(SourceLanguage::Python));
        assert_eq!(detect_language("src/lib.rs"), Some(SourceLanguage::Rust));
        assert_eq!(detect_language("README.md"), None);
        assert_eq!(detect_language("Makefile"), None);
    }
}
