//! Schema documents and parse settings.
//!
//! A [`ParserConfig`] is a command tree stored as YAML or JSON, so a CLI's
//! grammar can live next to the program instead of in code.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! command:
//!   name: media
//!   version: "2.1.0"
//!   flags:
//!     - name: verbose
//!       aliases: [v]
//!       global: true
//!   commands:
//!     - name: encode
//!       flags:
//!         - name: bitrate.audio
//!           aliases: [b.a]
//!           type: number
//!       arguments:
//!         - name: input
//!           type: file
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use command_args_core::{CommandNode, ValidationError, validate_schema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or saving a schema document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed but the command tree is structurally invalid.
    #[error("invalid schema: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ValidationError>),
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;

/// Settings for flag-level parsing with [`parse_flags`](crate::parse_flags).
///
/// Command-level parsing reads the same switches from each
/// [`CommandNode`] instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Stop matching flags at the first non-flag token.
    pub stop_early: bool,
    /// Skip required checks when no flag is present at all.
    pub allow_empty: bool,
}

/// A command tree stored as a YAML or JSON document.
///
/// # Examples
///
/// ```
/// use command_args_parser::ParserConfig;
///
/// let config = ParserConfig::from_yaml_str(r#"
/// version: "1.0"
/// command:
///   name: git
///   commands:
///     - name: commit
///       flags:
///         - name: message
///           aliases: [m]
///           type: string
/// "#).unwrap();
///
/// assert_eq!(config.command.name, "git");
/// assert!(config.command.find_command("commit").is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Document format version (e.g., `"1.0"`).
    pub version: String,
    /// Root of the command tree.
    pub command: CommandNode,
}

impl ParserConfig {
    /// Wraps a command tree.
    pub fn new(version: impl Into<String>, command: CommandNode) -> Self {
        Self {
            version: version.into(),
            command,
        }
    }

    /// Loads and validates a document. Files ending in `.json` are read as
    /// JSON, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](LoadError::Io) if the file cannot be read,
    /// [`Json`](LoadError::Json) or [`Yaml`](LoadError::Yaml) if parsing
    /// fails, and [`Invalid`](LoadError::Invalid) if the tree fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        config.validated()
    }

    /// Saves the document, choosing the format from the extension like
    /// [`load`](Self::load).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validated()
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    fn validated(self) -> Result<Self> {
        let errors = validate_schema(&self.command);
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(LoadError::Invalid(errors))
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use command_args_core::FlagSpec;
    use tempfile::TempDir;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
command:
  name: media
  version: "2.1.0"
  flags:
    - name: verbose
      aliases: [v]
      global: true
  commands:
    - name: encode
      stop_early: true
      flags:
        - name: bitrate.audio
          aliases: [b.a]
          type: number
          default: 128
      arguments:
        - name: input
          type: file
        - name: rest
          optional: true
          variadic: true
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config = ParserConfig::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.command.version.as_deref(), Some("2.1.0"));

        let encode = config.command.find_command("encode").unwrap();
        assert!(encode.stop_early);
        assert_eq!(encode.flags[0].default, Some(serde_json::json!(128)));
        assert_eq!(encode.arguments[0].value_type, "file");
        assert_eq!(encode.arguments[1].value_type, "string");
        assert!(encode.arguments[1].variadic);
    }

    #[test]
    fn test_invalid_tree_is_rejected() {
        let yaml = r#"
version: "1.0"
command:
  name: app
  flags:
    - name: force
      aliases: [f]
    - name: file
      aliases: [f]
"#;
        let err = ParserConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
        assert_eq!(err.to_string(), "invalid schema: duplicate flag in scope: f");
    }

    #[test]
    fn test_json_document() {
        let json = r#"{
            "version": "1.0",
            "command": { "name": "app", "flags": [{ "name": "dry-run", "override": false }] }
        }"#;
        let config = ParserConfig::from_json_str(json).unwrap();
        assert_eq!(config.command.flags[0].name, "dry-run");
    }

    #[test]
    fn test_save_and_load_roundtrip_by_extension() {
        let dir = TempDir::new().unwrap();
        let config = ParserConfig::new(
            "1.0",
            CommandNode::new("app").with_flag(FlagSpec::new("verbose").alias("v")),
        );

        for file in ["schema.yaml", "schema.json"] {
            let path = dir.path().join(file);
            config.save(&path).unwrap();
            let loaded = ParserConfig::load(&path).unwrap();
            assert_eq!(loaded.command.name, "app");
            assert_eq!(loaded.command.flags[0].aliases, vec!["v"]);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = ParserConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
