//! Shared test utilities for execute tests.
//!
//! This module provides the standard configuration the command tests compile
//! against.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::config::ConfigFile;

/// Mapping of a `Person` entity with scalar, renamed and nested properties.
pub const PERSON_CONFIG: &str = r#"
{
    "bucket": "travel-sample",
    "entities": [
        {
            "name": "Person",
            "type_alias": "com.example.Person",
            "properties": [
                { "name": "firstname", "kind": "string" },
                { "name": "lastName", "field": "lname", "kind": "string" },
                { "name": "age", "kind": "number" },
                { "name": "active", "kind": "boolean" },
                { "name": "gender", "kind": "enum" },
                { "name": "address", "kind": "object", "properties": [
                    { "name": "city", "kind": "string" }
                ] }
            ]
        }
    ]
}
"#;

/// Create a temporary file containing the given content.
pub fn create_temp_json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Parse [`PERSON_CONFIG`].
pub fn person_config() -> ConfigFile {
    serde_json::from_str(PERSON_CONFIG).expect("Test config should parse")
}
