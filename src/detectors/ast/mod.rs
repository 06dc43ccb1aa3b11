//! Syntax-tree pass of structure extraction.

pub mod ast;
pub mod python;
pub mod rust;

use crate::detectors::fingerprint::{Callable, DeclaredType};
use crate::detectors::language::SourceLanguage;
use crate::error::ParseError;

/// What the tree pass contributes to a fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeFacts {
    pub declared_types: Vec<DeclaredType>,
    pub callables: Vec<Callable>,
    pub imports: Vec<String>,
}

impl TreeFacts {
    pub fn push_import(&mut self, import: String) {
        if !import.is_empty() && !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }
}

pub fn collect_tree_facts(
    language: SourceLanguage,
    file: &str,
    source: &str,
) -> Result<TreeFacts, ParseError> {
    let tree = ast::parse_source(language, file, source)?;
    let root = tree.root_node();

    Ok(match language {
        SourceLanguage::Python => python::collect(root, source),
        SourceLanguage::Rust => rust::collect(root, source),
    })
}
