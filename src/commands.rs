//! Subcommand bodies for the `ticketgrep` binary.
//!
//! All file and stdin reading happens here; the library only sees strings.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use ticketgrep::detectors::language::is_supported;
use ticketgrep::links::{
    extract_from_development_payload, extract_from_text, merge_references, ChangeReference,
    DevelopmentPayload,
};
use ticketgrep::testgen::render::{tracker_comment, TestCasePayload};
use ticketgrep::{
    extract_structure, ChangedFile, GeneratorConfig, TestArtifacts, TestCaseGenerator, Ticket,
};

use crate::CliError;

const SKIP_DIRS: &[&str] = &["target", "node_modules", "__pycache__", "venv", ".venv"];

#[derive(Args, Debug)]
pub struct StructureArgs {
    #[arg(help = "Source file to analyse")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct LinksArgs {
    #[arg(long, help = "Text to scan for change references (`-` reads stdin)")]
    pub text: Option<PathBuf>,

    #[arg(long, help = "Development payload JSON file")]
    pub payload: Option<PathBuf>,

    #[arg(long, help = "Ticket key matched against branch names and commit messages")]
    pub ticket_key: Option<String>,

    #[arg(long, help = "Repository base URL used to build PR links (overrides config)")]
    pub base_url: Option<String>,

    #[arg(long, default_value_t = false, help = "Keep one entry per signal instead of merging")]
    pub no_merge: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Jira,
    Testrail,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long, help = "Ticket JSON file (`-` reads stdin)")]
    pub ticket: PathBuf,

    #[arg(help = "Changed source files or directories")]
    pub files: Vec<PathBuf>,

    #[arg(long, help = "Development payload JSON file for change linking")]
    pub payload: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/* ============================================================
   structure
   ============================================================ */

pub fn structure(args: StructureArgs) -> Result<(), CliError> {
    let source = read_input(&args.file)?;
    let fingerprint = extract_structure(&source, &args.file.to_string_lossy())?;
    print_json(&fingerprint)
}

/* ============================================================
   links
   ============================================================ */

pub fn links(args: LinksArgs, config: &GeneratorConfig) -> Result<(), CliError> {
    let base_url = args.base_url.as_deref().or(config.base_host_url.as_deref());
    let mut refs: Vec<ChangeReference> = Vec::new();

    if let Some(path) = &args.text {
        let text = read_input(path)?;
        refs.extend(extract_from_text(&text, base_url.unwrap_or_default()));
    }

    if let Some(path) = &args.payload {
        let payload: DevelopmentPayload = serde_json::from_str(&read_input(path)?)?;
        let key = args.ticket_key.as_deref().unwrap_or_default();
        refs.extend(extract_from_development_payload(key, &payload, base_url));
    }

    if !args.no_merge {
        refs = merge_references(refs);
    }

    info!(count = refs.len(), "links done");
    print_json(&refs)
}

/* ============================================================
   generate
   ============================================================ */

#[derive(Serialize)]
struct GenerateReport<'a> {
    generated_at: String,
    ticket: Option<&'a str>,
    change_references: Vec<ChangeReference>,
    #[serde(flatten)]
    artifacts: TestArtifacts,
}

pub fn generate(args: GenerateArgs, config: GeneratorConfig) -> Result<(), CliError> {
    let ticket: Ticket = serde_json::from_str(&read_input(&args.ticket)?)?;
    let payload: Option<DevelopmentPayload> = match &args.payload {
        Some(path) => Some(serde_json::from_str(&read_input(path)?)?),
        None => None,
    };

    let mut files = Vec::new();
    for path in collect_files(&args.files) {
        let content = read_input(&path)?;
        files.push(ChangedFile::new(path.to_string_lossy(), content));
    }

    let generator = TestCaseGenerator::new(config);
    let artifacts = generator.generate(&ticket, &files)?;

    match args.format {
        OutputFormat::Jira => {
            println!("{}", tracker_comment(&artifacts.proposals));
            Ok(())
        }
        OutputFormat::Testrail => {
            let bodies: Vec<TestCasePayload> =
                generator.test_case_payloads(&ticket, &artifacts.proposals);
            print_json(&bodies)
        }
        OutputFormat::Json => {
            let change_references = generator.link_changes(&ticket, payload.as_ref());
            print_json(&GenerateReport {
                generated_at: Utc::now().to_rfc3339(),
                ticket: ticket.key.as_deref(),
                change_references,
                artifacts,
            })
        }
    }
}

/// Explicit files are kept as given; directories contribute the
/// supported source files beneath them, sorted by path.
fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            out.push(input.clone());
            continue;
        }

        for entry in WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e.path()))
            .filter_map(Result::ok)
        {
            let p = entry.path();
            if p.is_file() && is_supported(&p.to_string_lossy()) {
                out.push(p.to_path_buf());
            }
        }
    }

    debug!(count = out.len(), "collected changed files");
    out
}

fn is_skipped_dir(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_dir() && (name.starts_with('.') || SKIP_DIRS.contains(&name))
}

/* ============================================================
   Helpers
   ============================================================ */

fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        return Ok(buf);
    }

    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_expand_to_supported_sources() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("pkg/b.py"), "").unwrap();
        fs::write(root.join("pkg/a.rs"), "").unwrap();
        fs::write(root.join("pkg/notes.md"), "").unwrap();
        fs::write(root.join("target/gen.rs"), "").unwrap();

        let explicit = root.join("pkg/notes.md");
        let files = collect_files(&[root.to_path_buf(), explicit.clone()]);

        assert_eq!(
            files,
            vec![root.join("pkg/a.rs"), root.join("pkg/b.py"), explicit]
        );
    }
}
