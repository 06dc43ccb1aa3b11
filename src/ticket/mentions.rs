//! ticket/mentions.rs
//!
//! Code the ticket author names in prose: function calls, PascalCase
//! type names, tables and `/api/...` paths. Informational only.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\([^)]*\)").expect("function mention"));
static PASCAL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-zA-Z0-9]+\b").expect("class mention"));
static TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:tbl|table)\s+([A-Za-z0-9_]+)\b").expect("table mention")
});
static API_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/api/[a-zA-Z0-9/_-]+").expect("api mention"));

/// Each list is sorted and unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMentions {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub tables: Vec<String>,
    pub api_paths: Vec<String>,
}

impl CodeMentions {
    pub fn extract(description: &str) -> Self {
        let whole = |re: &Regex| -> Vec<String> {
            re.find_iter(description)
                .map(|m| m.as_str().to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        let tables = TABLE
            .captures_iter(description)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            functions: whole(&FUNCTION_CALL),
            classes: whole(&PASCAL_CASE),
            tables,
            api_paths: whole(&API_PATH),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.classes.is_empty()
            && self.tables.is_empty()
            && self.api_paths.is_empty()
    }
}
