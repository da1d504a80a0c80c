//! Configuration file handling.
//!
//! This module loads `.n1ql_compiler.json`: the target bucket, the placeholder
//! style and the entity mappings the compiler resolves properties against.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mapping::EntityMapping;
use crate::query::CompileContext;
use crate::query::params::PlaceholderStyle;

pub const DEFAULT_CONFIG_PATH: &str = ".n1ql_compiler.json";

const EXAMPLE_CONFIG: &str = r#"{
  "bucket": "travel-sample",
  "placeholders": "positional",
  "entities": [
    { "name": "Person",
      "properties": [
        { "name": "firstname", "kind": "string" },
        { "name": "age", "kind": "number" }
      ] }
  ]
}"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}\n\nPlease create it, for example:\n\n{example}")]
    NotFound { path: PathBuf, example: &'static str },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Entity '{name}' is not mapped in the configuration")]
    UnknownEntity { name: String },
}

fn default_type_key() -> String {
    "_class".to_string()
}

/// Top-level configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub bucket: String,
    #[serde(default)]
    pub placeholders: PlaceholderStyle,
    /// Document field holding the entity type alias.
    #[serde(default = "default_type_key")]
    pub type_key: String,
    #[serde(default)]
    pub entities: Vec<EntityMapping>,
}

impl ConfigFile {
    /// Load configuration from `.n1ql_compiler.json` in the current directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// A distinct [`ConfigError`] for a missing file, an unreadable file and
    /// invalid JSON.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
                example: EXAMPLE_CONFIG,
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn entity(&self, name: &str) -> Option<&EntityMapping> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Compile context for `entity`: its mapping, the configured placeholder
    /// style and a type filter on the entity's alias.
    pub fn context(&self, entity: &str) -> Result<CompileContext<'_>, ConfigError> {
        let mapping = self.entity(entity).ok_or_else(|| ConfigError::UnknownEntity {
            name: entity.to_string(),
        })?;
        Ok(CompileContext::new(&self.bucket, mapping, mapping)
            .with_style(self.placeholders)
            .with_type_filter(&self.type_key, mapping.type_alias()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ScalarKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"
    {
        "bucket": "travel-sample",
        "placeholders": "named",
        "type_key": "type",
        "entities": [
            {
                "name": "Person",
                "type_alias": "com.example.Person",
                "properties": [
                    { "name": "firstname", "kind": "string" },
                    { "name": "lastName", "field": "lname", "kind": "string" },
                    { "name": "address", "kind": "object", "properties": [
                        { "name": "city", "kind": "string" }
                    ] }
                ]
            }
        ]
    }
    "#;

    #[test]
    fn test_full_deserialization() {
        let config: ConfigFile = serde_json::from_str(FULL).unwrap();
        assert_eq!(config.bucket, "travel-sample");
        assert_eq!(config.placeholders, PlaceholderStyle::Named);
        assert_eq!(config.type_key, "type");

        let person = config.entity("Person").unwrap();
        assert_eq!(person.type_alias(), "com.example.Person");
        assert_eq!(person.properties[1].field_name(), "lname");
        assert_eq!(person.properties[2].kind, ScalarKind::Object);
    }

    #[test]
    fn test_defaults() {
        let config: ConfigFile = serde_json::from_str(r#"{ "bucket": "b" }"#).unwrap();
        assert_eq!(config.placeholders, PlaceholderStyle::Positional);
        assert_eq!(config.type_key, "_class");
        assert!(config.entities.is_empty());
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let result: Result<ConfigFile, _> = serde_json::from_str(r#"{ "entities": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_context_for_unknown_entity() {
        let config: ConfigFile = serde_json::from_str(FULL).unwrap();
        assert!(matches!(
            config.context("Airline"),
            Err(ConfigError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_context_carries_style_and_type_filter() {
        let config: ConfigFile = serde_json::from_str(FULL).unwrap();
        let ctx = config.context("Person").unwrap();
        assert_eq!(ctx.bucket, "travel-sample");
        assert_eq!(ctx.style, PlaceholderStyle::Named);
        let filter = ctx.type_filter.unwrap();
        assert_eq!(filter.key, "type");
        assert_eq!(filter.alias, "com.example.Person");
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load_from(&temp_dir.path().join("absent.json"));
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ invalid json }").unwrap();
        file.flush().unwrap();

        let result = ConfigFile::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_from_unreadable_path() {
        // A directory exists but cannot be read as a file.
        let temp_dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load_from(temp_dir.path());
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_default_path_from_cwd() {
        use std::sync::Mutex;
        use std::sync::OnceLock;

        fn test_lock() -> &'static Mutex<()> {
            static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
            LOCK.get_or_init(|| Mutex::new(()))
        }

        let _lock = test_lock().lock();
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(DEFAULT_CONFIG_PATH), FULL).unwrap();

        let old_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = ConfigFile::load();

        std::env::set_current_dir(old_dir).unwrap();
        assert_eq!(result.unwrap().bucket, "travel-sample");
    }
}
