//! skeleton.rs
//!
//! Placeholder test code for an analysed file.
//!
//! One placeholder per callable plus one per (type, member) pair. Bodies
//! carry the Setup / Execute / Verify scaffold and nothing executable.

use std::collections::HashSet;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::detectors::language::SourceLanguage;
use crate::testgen::AnalyzedFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSkeleton {
    pub source_file: String,
    pub test_unit_name: String,
    pub code: String,
    /// Placeholder test names in emission order.
    pub placeholders: Vec<String>,
}

struct Placeholder {
    name: String,
    target: String,
    subject: Option<String>,
}

pub fn generate_skeletons(files: &[AnalyzedFile]) -> Vec<TestSkeleton> {
    files.iter().map(skeleton_for).collect()
}

pub fn skeleton_for(file: &AnalyzedFile) -> TestSkeleton {
    let fp = &file.fingerprint;
    let stem = Path::new(&file.path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let rust = fp.language == SourceLanguage::Rust;
    let mut placeholders = Vec::with_capacity(fp.placeholder_count());
    let mut taken = HashSet::new();

    for c in &fp.callables {
        let name = if rust { to_snake(&c.name) } else { c.name.clone() };
        placeholders.push(Placeholder {
            name: unique_name(&mut taken, format!("test_{name}")),
            target: c.name.clone(),
            subject: None,
        });
    }

    for ty in &fp.declared_types {
        for member in &ty.members {
            let name = if rust {
                format!("test_{}_{}", to_snake(&ty.name), to_snake(member))
            } else {
                format!("test_{}_{member}", ty.name)
            };
            placeholders.push(Placeholder {
                name: unique_name(&mut taken, name),
                target: member.clone(),
                subject: Some(ty.name.clone()),
            });
        }
    }

    let (test_unit_name, code) = match fp.language {
        SourceLanguage::Python => python_unit(&file.path, &stem, &placeholders),
        SourceLanguage::Rust => rust_unit(&stem, &placeholders),
    };

    TestSkeleton {
        source_file: file.path.clone(),
        test_unit_name,
        code,
        placeholders: placeholders.into_iter().map(|p| p.name).collect(),
    }
}

/* ============================================================
   Python
   ============================================================ */

fn python_unit(path: &str, stem: &str, placeholders: &[Placeholder]) -> (String, String) {
    let class = format!("Test{}", title_case(stem));
    let module = python_module(path);

    let mut code = format!(
        "import unittest\nfrom {module} import *\n\n\n\
         class {class}(unittest.TestCase):\n\
         \x20   def setUp(self):\n\
         \x20       \"\"\"Set up test fixtures.\"\"\"\n\
         \x20       pass\n\n\
         \x20   def tearDown(self):\n\
         \x20       \"\"\"Tear down test fixtures.\"\"\"\n\
         \x20       pass\n"
    );

    for p in placeholders {
        let setup = match &p.subject {
            Some(ty) => format!("Create {ty} instance"),
            None => "Set up test environment".to_string(),
        };
        let label = match &p.subject {
            Some(ty) => format!("{ty}.{}", p.target),
            None => p.target.clone(),
        };
        code.push_str(&format!(
            "\n    def {name}(self):\n\
             \x20       \"\"\"Test {label}.\"\"\"\n\
             \x20       # Setup\n\
             \x20       # TODO: {setup}\n\
             \x20       # Execute\n\
             \x20       # TODO: Call {target}\n\
             \x20       # Verify\n\
             \x20       # TODO: Add assertions\n",
            name = p.name,
            target = p.target,
        ));
    }

    code.push_str("\n\nif __name__ == \"__main__\":\n    unittest.main()\n");
    (class, code)
}

/* ============================================================
   Rust
   ============================================================ */

fn rust_unit(stem: &str, placeholders: &[Placeholder]) -> (String, String) {
    let module = format!("{}_tests", to_snake(stem));
    let mut code = format!("#[cfg(test)]\nmod {module} {{\n    use super::*;\n");

    for p in placeholders {
        let setup = match &p.subject {
            Some(ty) => format!("construct {ty}"),
            None => "set up test fixtures".to_string(),
        };
        code.push_str(&format!(
            "\n    #[test]\n\
             \x20   fn {name}() {{\n\
             \x20       // Setup\n\
             \x20       // TODO: {setup}\n\
             \x20       // Execute\n\
             \x20       // TODO: call {target}\n\
             \x20       // Verify\n\
             \x20       // TODO: add assertions\n\
             \x20   }}\n",
            name = p.name,
            target = p.target,
        ));
    }

    code.push_str("}\n");
    (module, code)
}

/* ============================================================
   Helpers
   ============================================================ */

/// `test_new`, `test_new_2`, `test_new_3`, ... in emission order.
fn unique_name(taken: &mut HashSet<String>, base: String) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Dotted import path; `./pkg/a.py` and `/abs/pkg/a.py` keep only the
/// normal components.
fn python_module(path: &str) -> String {
    let path = path.replace('\\', "/");
    Path::new(&path)
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// `user_routes` -> `UserRoutes`.
fn title_case(stem: &str) -> String {
    let out: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if out.is_empty() {
        "Module".to_string()
    } else {
        out
    }
}

/// `OrderStatus` -> `order_status`, `HTTPClient` -> `http_client`.
fn to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::fingerprint::{
        Callable, DeclaredType, FileClassification, SourceFingerprint,
    };

    fn analyzed(path: &str, language: SourceLanguage, types: Vec<DeclaredType>) -> AnalyzedFile {
        AnalyzedFile {
            path: path.into(),
            fingerprint: SourceFingerprint {
                language,
                declared_types: types,
                callables: vec![],
                imports: vec![],
                api_endpoints: vec![],
                persistence_operations: vec![],
                file_classification: FileClassification::Unknown,
            },
        }
    }

    fn foo() -> Vec<DeclaredType> {
        vec![DeclaredType {
            name: "Foo".into(),
            members: vec!["bar".into(), "baz".into()],
        }]
    }

    #[test]
    fn one_placeholder_per_member() {
        let s = skeleton_for(&analyzed("pkg/foo_service.py", SourceLanguage::Python, foo()));
        assert_eq!(s.test_unit_name, "TestFooService");
        assert_eq!(s.placeholders, vec!["test_Foo_bar", "test_Foo_baz"]);
        assert!(s.code.contains("from pkg.foo_service import *"));
        assert!(s.code.contains("class TestFooService(unittest.TestCase):"));
        assert_eq!(s.code.matches("# Setup").count(), 2);
        assert_eq!(s.code.matches("# TODO:").count(), 6);
        assert!(!s.code.contains("self.assert"));
    }

    #[test]
    fn rust_skeleton_is_a_test_module() {
        let types = vec![DeclaredType {
            name: "OrderStatus".into(),
            members: vec!["Pending".into()],
        }];
        let s = skeleton_for(&analyzed("src/order.rs", SourceLanguage::Rust, types));
        assert_eq!(s.test_unit_name, "order_tests");
        assert_eq!(s.placeholders, vec!["test_order_status_pending"]);
        assert!(s.code.starts_with("#[cfg(test)]\nmod order_tests {"));
        assert!(s.code.contains("    fn test_order_status_pending() {"));
        assert!(s.code.contains("// Verify\n        // TODO: add assertions"));
    }

    #[test]
    fn no_targets_still_emits_a_unit() {
        let s = skeleton_for(&analyzed("empty.py", SourceLanguage::Python, vec![]));
        assert!(s.placeholders.is_empty());
        assert!(s.code.contains("def setUp(self):"));
    }

    #[test]
    fn colliding_names_get_a_suffix() {
        let types = vec![
            DeclaredType {
                name: "A".into(),
                members: vec!["new".into()],
            },
            DeclaredType {
                name: "B".into(),
                members: vec!["new".into()],
            },
        ];
        let mut file = analyzed("src/pair.rs", SourceLanguage::Rust, types);
        file.fingerprint.callables = vec![
            Callable {
                name: "new".into(),
                parameters: vec![],
            },
            Callable {
                name: "new".into(),
                parameters: vec![],
            },
        ];

        let s = skeleton_for(&file);
        assert_eq!(s.placeholders, vec!["test_new", "test_new_2", "test_a_new", "test_b_new"]);
        assert_eq!(s.code.matches("fn test_new()").count(), 1);
        assert!(s.code.contains("fn test_new_2()"));
    }

    #[test]
    fn python_import_path_drops_dot_and_root() {
        assert_eq!(python_module("./pkg/a.py"), "pkg.a");
        assert_eq!(python_module("/srv/app/pkg/a.py"), "srv.app.pkg.a");
        assert_eq!(python_module("pkg\\sub\\b.py"), "pkg.sub.b");

        let s = skeleton_for(&analyzed("./pkg/a.py", SourceLanguage::Python, vec![]));
        assert!(s.code.contains("from pkg.a import *"));
    }

    #[test]
    fn naming_helpers() {
        assert_eq!(title_case("user_routes"), "UserRoutes");
        assert_eq!(title_case("__init__"), "Init");
        assert_eq!(to_snake("HTTPClient"), "http_client");
        assert_eq!(to_snake("OrderStatus"), "order_status");
        assert_eq!(to_snake("already_snake"), "already_snake");
    }
}
