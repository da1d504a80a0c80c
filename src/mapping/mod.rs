//! Seam to the document mapping layer.
//!
//! The compiler never decides how a logical property is stored. It asks a
//! [`FieldPathResolver`] for the escaped storage path and a
//! [`PropertyTypeResolver`] for the stored scalar kind. Both are read-only and
//! may be shared across concurrent compilations.
//!
//! [`EntityMapping`] is a metadata-backed implementation of both traits, loaded
//! from the configuration file by the CLI and used throughout the tests.

mod entity;

pub use entity::{EntityMapping, PropertyMapping};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CompileError;
use crate::query::escape::{is_quoted, quote_identifier};

/// An escaped, dot-separated storage path such as `` `address`.`city` ``.
///
/// Opaque to the compiler: it is rendered as-is, or wrapped in a case-folding
/// function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Build from unescaped storage segments: `["address", "city"]`.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = segments
            .into_iter()
            .map(|s| quote_identifier(s.as_ref()))
            .collect::<Vec<_>>()
            .join(".");
        FieldPath(path)
    }

    /// Build from a user-facing key.
    ///
    /// Already quoted keys and function expressions (`meta().id`) are kept
    /// verbatim, anything else is quoted segment by segment.
    pub fn from_key(key: &str) -> Self {
        if is_quoted(key) || key.contains('(') {
            FieldPath(key.to_string())
        } else {
            Self::from_segments(key.split('.'))
        }
    }

    /// Wrap an already-escaped path without touching it.
    pub fn raw(path: impl Into<String>) -> Self {
        FieldPath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier-safe name for named placeholders: `` `addr`.`city` `` -> `addr_city`.
    pub fn param_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
            } else if c == '.' && !name.is_empty() && !name.ends_with('_') {
                name.push('_');
            }
        }
        if name.is_empty() {
            name.push('p');
        }
        name
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored kind of a property, as written to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
    /// Enums are stored by variant name.
    Enum,
    Object,
    Array,
}

impl ScalarKind {
    /// Whether values of this kind are stored as text and can be case-folded.
    pub fn is_textual(self) -> bool {
        matches!(self, ScalarKind::String | ScalarKind::Enum)
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Enum => "enum",
            ScalarKind::Object => "object",
            ScalarKind::Array => "array",
        }
    }
}

/// Resolves a logical property path (`address.city`) to its storage path.
pub trait FieldPathResolver: Send + Sync {
    /// Fails with [`CompileError::PropertyNotFound`] for unknown paths.
    fn resolve(&self, property_path: &str) -> Result<FieldPath, CompileError>;
}

/// Reports the stored kind of a resolved field.
pub trait PropertyTypeResolver: Send + Sync {
    fn type_of(&self, field: &FieldPath) -> Result<ScalarKind, CompileError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name", "`name`")]
    #[case("address.city", "`address`.`city`")]
    #[case("`already`", "`already`")]
    #[case("meta().id", "meta().id")]
    fn test_from_key(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(FieldPath::from_key(key).as_str(), expected);
    }

    #[test]
    fn test_from_segments() {
        let path = FieldPath::from_segments(["addr", "street"]);
        assert_eq!(path.to_string(), "`addr`.`street`");
    }

    #[rstest]
    #[case("`age`", "age")]
    #[case("`addr`.`street`", "addr_street")]
    #[case("meta().id", "meta_id")]
    fn test_param_name(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(FieldPath::raw(raw).param_name(), expected);
    }

    #[test]
    fn test_enum_kind_is_textual() {
        assert!(ScalarKind::Enum.is_textual());
        assert!(ScalarKind::String.is_textual());
        assert!(!ScalarKind::Number.is_textual());
    }
}
