//! Source structure extraction.
//!
//! Two independent passes over the same text: the syntax-tree pass
//! (`ast`) and the raw-text pass (`lexical`). Classification only looks
//! at the file name.

pub mod ast;
pub mod classify;
pub mod fingerprint;
pub mod language;
pub mod lexical;

use tracing::debug;

use crate::error::ParseError;
use fingerprint::SourceFingerprint;

/// Build the structural fingerprint of one file.
///
/// All-or-nothing: a file the grammar rejects yields `ParseError`, never a
/// partial fingerprint.
pub fn extract_structure(source: &str, file: &str) -> Result<SourceFingerprint, ParseError> {
    let language = language::detect_language(file).ok_or_else(|| ParseError::UnsupportedLanguage {
        path: file.to_string(),
    })?;

    let tree = ast::collect_tree_facts(language, file, source)?;
    let lexical = lexical::scan(source);

    debug!(
        file,
        %language,
        types = tree.declared_types.len(),
        callables = tree.callables.len(),
        imports = tree.imports.len(),
        endpoints = lexical.api_endpoints.len(),
        persistence = lexical.persistence_operations.len(),
        "extracted structure"
    );

    Ok(SourceFingerprint {
        language,
        declared_types: tree.declared_types,
        callables: tree.callables,
        imports: tree.imports,
        api_endpoints: lexical.api_endpoints,
        persistence_operations: lexical.persistence_operations,
        file_classification: classify::classify_file(file),
    })
}
