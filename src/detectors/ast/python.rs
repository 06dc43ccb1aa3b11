//! detectors/ast/python.rs
//!
//! Python tree walk: classes, functions, imports.

use tree_sitter::Node;

use super::ast::{field_text, named_children, node_text};
use super::TreeFacts;
use crate::detectors::fingerprint::{Callable, DeclaredType};

pub fn collect(root: Node, src: &str) -> TreeFacts {
    let mut facts = TreeFacts::default();
    walk(root, src, &mut facts);
    facts
}

fn walk(node: Node, src: &str, facts: &mut TreeFacts) {
    match node.kind() {
        "class_definition" => {
            if let Some(name) = field_text(node, "name", src) {
                facts.declared_types.push(DeclaredType {
                    name,
                    members: class_methods(node, src),
                });
            }
        }
        "function_definition" => {
            if let Some(name) = field_text(node, "name", src) {
                facts.callables.push(Callable {
                    name,
                    parameters: parameters(node, src),
                });
            }
        }
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                if let Some(module) = imported_name(name, src) {
                    facts.push_import(module);
                }
            }
        }
        "import_from_statement" => import_from(node, src, facts),
        _ => {}
    }

    for child in named_children(node) {
        walk(child, src, facts);
    }
}

/* ============================================================
   Classes
   ============================================================ */

fn class_methods(class: Node, src: &str) -> Vec<String> {
    let Some(body) = class.child_by_field_name("body") else {
        return Vec::new();
    };

    named_children(body)
        .into_iter()
        .filter_map(|child| match child.kind() {
            "function_definition" => Some(child),
            "decorated_definition" => child
                .child_by_field_name("definition")
                .filter(|d| d.kind() == "function_definition"),
            _ => None,
        })
        .filter_map(|f| field_text(f, "name", src))
        .collect()
}

/* ============================================================
   Functions
   ============================================================ */

fn parameters(function: Node, src: &str) -> Vec<String> {
    let Some(params) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };

    named_children(params)
        .into_iter()
        .filter_map(|p| parameter_name(p, src))
        .collect()
}

fn parameter_name(param: Node, src: &str) -> Option<String> {
    match param.kind() {
        "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            node_text(param, src).map(str::to_owned)
        }
        "default_parameter" | "typed_default_parameter" => field_text(param, "name", src),
        // typed_parameter has no name field; the first named child is the name
        "typed_parameter" => named_children(param)
            .into_iter()
            .next()
            .and_then(|n| node_text(n, src))
            .map(str::to_owned),
        // bare `*` and `/` separators
        _ => None,
    }
}

/* ============================================================
   Imports
   ============================================================ */

fn imported_name(node: Node, src: &str) -> Option<String> {
    match node.kind() {
        "aliased_import" => field_text(node, "name", src),
        _ => node_text(node, src).map(str::to_owned),
    }
}

fn import_from(node: Node, src: &str, facts: &mut TreeFacts) {
    let module = field_text(node, "module_name", src).unwrap_or_default();

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        if let Some(n) = imported_name(name, src) {
            names.push(n);
        }
    }

    if named_children(node)
        .iter()
        .any(|c| c.kind() == "wildcard_import")
    {
        names.push("*".to_string());
    }

    for name in names {
        facts.push_import(join_module(&module, &name));
    }
}

/// `from Y import X` → `Y.X`; relative `from . import X` → `.X`.
fn join_module(module: &str, name: &str) -> String {
    if module.is_empty() || module.ends_with('.') {
        format!("{module}{name}")
    } else {
        format!("{module}.{name}")
    }
}
