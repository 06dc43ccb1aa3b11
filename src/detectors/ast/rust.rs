//! detectors/ast/rust.rs
//!
//! Rust tree walk: type items (with fields, variants and impl methods),
//! functions, and expanded `use` paths.

use std::collections::HashMap;

use tree_sitter::Node;

use super::ast::{field_text, named_children, node_text};
use super::TreeFacts;
use crate::detectors::fingerprint::{Callable, DeclaredType};

pub fn collect(root: Node, src: &str) -> TreeFacts {
    let mut facts = TreeFacts::default();
    let mut impl_methods: HashMap<String, Vec<String>> = HashMap::new();

    walk(root, src, &mut facts, &mut impl_methods);

    for ty in &mut facts.declared_types {
        if let Some(methods) = impl_methods.remove(&ty.name) {
            for m in methods {
                if !ty.members.contains(&m) {
                    ty.members.push(m);
                }
            }
        }
    }

    facts
}

fn walk(
    node: Node,
    src: &str,
    facts: &mut TreeFacts,
    impl_methods: &mut HashMap<String, Vec<String>>,
) {
    match node.kind() {
        "struct_item" | "union_item" | "enum_item" | "trait_item" => {
            if let Some(name) = field_text(node, "name", src) {
                facts.declared_types.push(DeclaredType {
                    name,
                    members: item_members(node, src),
                });
            }
        }
        "impl_item" => {
            if let Some(target) = impl_target(node, src) {
                let entry = impl_methods.entry(target).or_default();
                entry.extend(body_functions(node, src, &["function_item"]));
            }
        }
        "function_item" => {
            if let Some(name) = field_text(node, "name", src) {
                facts.callables.push(Callable {
                    name,
                    parameters: parameters(node, src),
                });
            }
        }
        "use_declaration" => {
            if let Some(arg) = node.child_by_field_name("argument") {
                let mut paths = Vec::new();
                expand_use(arg, "", src, &mut paths);
                for p in paths {
                    facts.push_import(p);
                }
            }
        }
        _ => {}
    }

    for child in named_children(node) {
        walk(child, src, facts, impl_methods);
    }
}

/* ============================================================
   Types
   ============================================================ */

fn item_members(item: Node, src: &str) -> Vec<String> {
    match item.kind() {
        "trait_item" => body_functions(item, src, &["function_signature_item", "function_item"]),
        _ => {
            let Some(body) = item.child_by_field_name("body") else {
                return Vec::new();
            };
            named_children(body)
                .into_iter()
                .filter(|c| matches!(c.kind(), "field_declaration" | "enum_variant"))
                .filter_map(|c| field_text(c, "name", src))
                .collect()
        }
    }
}

fn body_functions(item: Node, src: &str, kinds: &[&str]) -> Vec<String> {
    let Some(body) = item.child_by_field_name("body") else {
        return Vec::new();
    };

    named_children(body)
        .into_iter()
        .filter(|c| kinds.contains(&c.kind()))
        .filter_map(|c| field_text(c, "name", src))
        .collect()
}

/// `impl<T> Foo<T>` and `impl Trait for crate::Foo` both resolve to `Foo`.
fn impl_target(node: Node, src: &str) -> Option<String> {
    let mut ty = node.child_by_field_name("type")?;

    loop {
        match ty.kind() {
            "generic_type" => ty = ty.child_by_field_name("type")?,
            "scoped_type_identifier" => ty = ty.child_by_field_name("name")?,
            _ => break,
        }
    }

    node_text(ty, src).map(str::to_owned)
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
        .filter_map(|p| match p.kind() {
            "self_parameter" => Some("self".to_string()),
            "parameter" => field_text(p, "pattern", src),
            _ => None,
        })
        .collect()
}

/* ============================================================
   Use declarations
   ============================================================ */

fn expand_use(node: Node, prefix: &str, src: &str, out: &mut Vec<String>) {
    match node.kind() {
        "use_as_clause" => {
            if let Some(path) = node.child_by_field_name("path") {
                expand_use(path, prefix, src, out);
            }
        }
        "scoped_use_list" => {
            let joined = match field_text(node, "path", src) {
                Some(path) => join_path(prefix, &compact(&path)),
                None => prefix.to_string(),
            };
            if let Some(list) = node.child_by_field_name("list") {
                expand_use(list, &joined, src, out);
            }
        }
        "use_list" => {
            for item in named_children(node) {
                expand_use(item, prefix, src, out);
            }
        }
        "self" if !prefix.is_empty() => out.push(prefix.to_string()),
        _ => {
            if let Some(text) = node_text(node, src) {
                out.push(join_path(prefix, &compact(text)));
            }
        }
    }
}

fn join_path(prefix: &str, item: &str) -> String {
    if prefix.is_empty() {
        item.to_string()
    } else {
        format!("{prefix}::{item}")
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
