//! Metadata-backed mapping of one entity type.

use serde::{Deserialize, Serialize};

use super::{FieldPath, FieldPathResolver, PropertyTypeResolver, ScalarKind};
use crate::error::CompileError;

/// A mapped property. `field` overrides the stored name when it differs from
/// the logical one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub kind: ScalarKind,
    /// Nested properties of an `object` property.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyMapping>,
}

impl PropertyMapping {
    pub fn new(name: &str, kind: ScalarKind) -> Self {
        Self {
            name: name.to_string(),
            field: None,
            kind,
            properties: Vec::new(),
        }
    }

    /// Store the property under a different field name.
    pub fn stored_as(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    /// Add nested properties (turns the property into an object).
    pub fn with_properties(mut self, properties: Vec<PropertyMapping>) -> Self {
        self.kind = ScalarKind::Object;
        self.properties = properties;
        self
    }

    /// Name under which the property is written to the document.
    pub fn field_name(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }
}

/// Mapping metadata for one entity: its type alias and mapped properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMapping {
    pub name: String,
    /// Value written to the type key; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_alias: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyMapping>,
}

impl EntityMapping {
    pub fn new(name: &str, properties: Vec<PropertyMapping>) -> Self {
        Self {
            name: name.to_string(),
            type_alias: None,
            properties,
        }
    }

    pub fn with_type_alias(mut self, alias: &str) -> Self {
        self.type_alias = Some(alias.to_string());
        self
    }

    pub fn type_alias(&self) -> &str {
        self.type_alias.as_deref().unwrap_or(&self.name)
    }

    fn find_kind<'a>(
        properties: &'a [PropertyMapping],
        prefix: &mut Vec<&'a str>,
        target: &FieldPath,
    ) -> Option<ScalarKind> {
        for property in properties {
            prefix.push(property.field_name());
            if FieldPath::from_segments(prefix.iter()) == *target {
                return Some(property.kind);
            }
            if let Some(kind) = Self::find_kind(&property.properties, prefix, target) {
                return Some(kind);
            }
            prefix.pop();
        }
        None
    }
}

impl FieldPathResolver for EntityMapping {
    fn resolve(&self, property_path: &str) -> Result<FieldPath, CompileError> {
        let mut properties = self.properties.as_slice();
        let mut segments = Vec::new();

        for name in property_path.split('.') {
            let property = properties
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| CompileError::not_found(property_path))?;
            segments.push(property.field_name());
            properties = &property.properties;
        }

        Ok(FieldPath::from_segments(segments))
    }
}

impl PropertyTypeResolver for EntityMapping {
    fn type_of(&self, field: &FieldPath) -> Result<ScalarKind, CompileError> {
        Self::find_kind(&self.properties, &mut Vec::new(), field)
            .ok_or_else(|| CompileError::not_found(field.as_str()))
    }
}
