//! detectors/lexical.rs
//!
//! Raw-text scans for route registrations and persistence touchpoints.
//!
//! Runs over the file text only. It never sees the syntax tree, so it
//! behaves the same whichever grammar parsed the file.

use std::sync::LazyLock;

use regex::Regex;

/* ============================================================
   Patterns
   ============================================================ */

static ROUTE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // @app.get("/users"), @router.post('/x'), @blueprint.route("/y")
        r#"@(?:app|router|blueprint|bp)\.(?:route|get|post|put|delete|patch)\(\s*['"]([^'"]+)['"]"#,
        r#"@api\.(?:route|get|post|put|delete|patch)\(\s*['"]([^'"]+)['"]"#,
        // #[get("/users")]
        r#"#\[(?:get|post|put|delete|patch|head)\(\s*"([^"]+)""#,
        // Router::new().route("/users", get(list))
        r#"\.route\(\s*"([^"]+)""#,
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("route pattern"))
    .collect()
});

/// Patterns whose whole match is the token.
static ORM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:db|session)\.(?:query|add|delete|commit|execute)\b",
        r"\b[A-Za-z_]*Model\.(?:query|create|update|delete)\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("orm pattern"))
    .collect()
});

/// Raw SQL; capture group 1 is the table.
static SQL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:insert|update|delete|select)\b.*?\b(?:from|into)\s+(\w+)")
        .expect("sql pattern")
});

/* ============================================================
   Public API
   ============================================================ */

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexicalSignals {
    pub api_endpoints: Vec<String>,
    pub persistence_operations: Vec<String>,
}

pub fn scan(source: &str) -> LexicalSignals {
    LexicalSignals {
        api_endpoints: scan_routes(source),
        persistence_operations: scan_persistence(source),
    }
}

/// Route paths in order of first appearance in `source`.
pub fn scan_routes(source: &str) -> Vec<String> {
    let mut hits: Vec<(usize, &str)> = Vec::new();
    for re in ROUTE_PATTERNS.iter() {
        for caps in re.captures_iter(source) {
            if let Some(path) = caps.get(1) {
                hits.push((path.start(), path.as_str()));
            }
        }
    }
    in_source_order(hits)
}

/// ORM tokens and SQL tables in order of first appearance in `source`.
pub fn scan_persistence(source: &str) -> Vec<String> {
    let mut hits: Vec<(usize, &str)> = Vec::new();

    for re in ORM_PATTERNS.iter() {
        for m in re.find_iter(source) {
            hits.push((m.start(), m.as_str()));
        }
    }

    for caps in SQL_PATTERN.captures_iter(source) {
        if let Some(table) = caps.get(1) {
            hits.push((table.start(), table.as_str()));
        }
    }

    in_source_order(hits)
}

/* ============================================================
   Helpers
   ============================================================ */

/// Sort by offset and keep the first occurrence of each value.
fn in_source_order(mut hits: Vec<(usize, &str)>) -> Vec<String> {
    hits.sort_by_key(|&(start, _)| start);

    let mut out: Vec<String> = Vec::new();
    for (_, value) in hits {
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_decorator_routes() {
        let src = r#"
@app.route("/health")
def health(): ...

@router.post('/users/<id>')
def create(id): ...

@api.get("/health")
def again(): ...
"#;
        assert_eq!(scan_routes(src), vec!["/health", "/users/<id>"]);
    }

    #[test]
    fn rust_attribute_and_router_routes() {
        let src = r#"
#[get("/orders")]
async fn list() {}

let app = Router::new().route("/orders/:id", get(show));
"#;
        assert_eq!(scan_routes(src), vec!["/orders", "/orders/:id"]);
    }

    #[test]
    fn orm_tokens_then_sql_tables() {
        let src = r#"
db.session.add(user)
db.session.commit()
rows = UserModel.query.all()
cur.execute("SELECT id FROM accounts WHERE id = ?")
cur.execute("insert into audit_log values (?)")
"#;
        assert_eq!(
            scan_persistence(src),
            vec![
                "session.add",
                "session.commit",
                "UserModel.query",
                "accounts",
                "audit_log",
            ]
        );
    }

    #[test]
    fn mixed_forms_keep_text_order() {
        let src = "UserModel.query.all()\nsession.add(x)\n\
                   rows = db.execute(\"select * from orders\")\nsession.add(y)\n";
        assert_eq!(
            scan_persistence(src),
            vec!["UserModel.query", "session.add", "db.execute", "orders"]
        );

        let routes = "@api.get(\"/a\")\ndef a(): ...\n\n@app.route(\"/b\")\ndef b(): ...\n";
        assert_eq!(scan_routes(routes), vec!["/a", "/b"]);
    }

    #[test]
    fn plain_code_has_no_signals() {
        let s = scan("def add(a, b):\n    return a + b\n");
        assert_eq!(s, LexicalSignals::default());
    }
}
