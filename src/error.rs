//! Error types for ticketgrep.
//!
//! Structure extraction fails per file (`ParseError`) and the orchestrator
//! turns that into a diagnostic. A malformed ticket (`InputValidationError`)
//! aborts the whole generate call. Change-link extraction has no error type.

use std::path::PathBuf;

use thiserror::Error;

/// A single source file could not be turned into a structural fingerprint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No grammar is registered for the file's extension.
    #[error("no grammar for {path}")]
    UnsupportedLanguage { path: String },

    /// The grammar could not be loaded or the parser gave up.
    #[error("grammar failure for {path}: {reason}")]
    Grammar { path: String, reason: String },

    /// The tree contains an error or missing node.
    #[error("syntax error in {path} at {line}:{column}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    pub fn path(&self) -> &str {
        match self {
            Self::UnsupportedLanguage { path }
            | Self::Grammar { path, .. }
            | Self::Syntax { path, .. } => path,
        }
    }
}

/// The ticket handed to the generator is missing something required.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputValidationError {
    #[error("ticket field `{field}` is required")]
    MissingField { field: &'static str },
}

/// Configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_displays_position() {
        let err = ParseError::Syntax {
            path: "app/models.py".into(),
            line: 3,
            column: 7,
        };
        assert_eq!(err.to_string(), "syntax error in app/models.py at 3:7");
        assert_eq!(err.path(), "app/models.py");
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = InputValidationError::MissingField { field: "title" };
        assert!(err.to_string().contains("`title`"));
    }
}
