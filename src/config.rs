use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Everything the generator needs that is not part of the ticket.
///
/// Passed by value into the core; nothing is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Repository host used to build PR URLs for bare mentions.
    pub base_host_url: Option<String>,
    pub test_file_prefix: String,
    pub parallel_extraction: bool,
    pub testrail_section_id: u64,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_host_url: None,
            test_file_prefix: "test_".into(),
            parallel_extraction: true,
            testrail_section_id: 1,
            log_level: "info".into(),
            log_json: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    generator: Option<GeneratorConfig>,
}

pub fn default_config_path() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("ticketgrep");
    dir.push("config.toml");
    dir
}

impl GeneratorConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file means defaults. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if !explicit && e.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        Self::parse(&raw).map_err(|source| ConfigError::Toml { path, source })
    }

    /// Accepts either a `[generator]` table or the fields at top level.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(raw)?;
        match file.generator {
            Some(cfg) => Ok(cfg),
            None => toml::from_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.test_file_prefix, "test_");
        assert!(cfg.parallel_extraction);
        assert_eq!(cfg.testrail_section_id, 1);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "[generator]\nbase_host_url = \"https://github.com/acme/shop\"\ntestrail_section_id = 12"
        )
        .unwrap();

        let cfg = GeneratorConfig::load(Some(f.path())).unwrap();
        assert_eq!(cfg.base_host_url.as_deref(), Some("https://github.com/acme/shop"));
        assert_eq!(cfg.testrail_section_id, 12);
        assert_eq!(cfg.test_file_prefix, "test_");
    }

    #[test]
    fn top_level_fields_are_accepted() {
        let cfg = GeneratorConfig::parse("parallel_extraction = false\nlog_json = true").unwrap();
        assert!(!cfg.parallel_extraction);
        assert!(cfg.log_json);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GeneratorConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "testrail_section_id = \"twelve\"").unwrap();
        let err = GeneratorConfig::load(Some(f.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }
}
