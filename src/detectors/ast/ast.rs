//! detectors/ast/ast.rs
//!
//! Tree-sitter parsing with all-or-nothing error detection.

use std::cell::RefCell;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::detectors::language::SourceLanguage;
use crate::error::ParseError;

thread_local! {
    static PY_PARSER: RefCell<Parser> = RefCell::new(Parser::new());
    static RS_PARSER: RefCell<Parser> = RefCell::new(Parser::new());
}

/// Parse `source` and reject any tree that contains an error or missing node.
pub fn parse_source(
    language: SourceLanguage,
    file: &str,
    source: &str,
) -> Result<Tree, ParseError> {
    let parsed = match language {
        SourceLanguage::Python => PY_PARSER.with(|p| {
            run_parser(&mut p.borrow_mut(), tree_sitter_python::language(), source)
        }),
        SourceLanguage::Rust => RS_PARSER.with(|p| {
            run_parser(&mut p.borrow_mut(), tree_sitter_rust::language(), source)
        }),
    };

    let tree = parsed.map_err(|reason| ParseError::Grammar {
        path: file.to_string(),
        reason,
    })?;

    if let Some(bad) = first_error_node(tree.root_node()) {
        let pos = bad.start_position();
        return Err(ParseError::Syntax {
            path: file.to_string(),
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    Ok(tree)
}

fn run_parser(parser: &mut Parser, grammar: Language, source: &str) -> Result<Tree, String> {
    if parser.language().is_none() {
        parser.set_language(&grammar).map_err(|e| e.to_string())?;
    }

    parser
        .parse(source, None)
        .ok_or_else(|| "parser produced no tree".to_string())
}

pub fn first_error_node(node: Node) -> Option<Node> {
    if !node.has_error() {
        return None;
    }

    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for child in children {
        if let Some(bad) = first_error_node(child) {
            return Some(bad);
        }
    }

    // has_error() without a reachable error child; report the node itself
    Some(node)
}

/* ============================================================
   Node helpers
   ============================================================ */

pub fn node_text<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    node.utf8_text(source.as_bytes()).ok()
}

pub fn field_text(node: Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| node_text(n, source))
        .map(str::to_owned)
}

pub fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}
