//! Values that end up in rendered statements or in the bound-value buffer.
//!
//! `Value` is what the storage engine receives. `Argument` is what callers hand
//! in: a method-call argument for derived queries, or a constant in a predicate
//! tree. Arguments may carry shapes the engine has no notion of (enum variants,
//! nested collections), so they are converted to `Value` before binding.

use serde::{Deserialize, Serialize};

use super::escape::quote_string;
use crate::error::CompileError;

/// A JSON-compatible scalar or array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        }
    }

    /// Render as an inline literal.
    ///
    /// Strings are double-quoted with embedded quotes doubled, `Null` renders as
    /// the bare `null` keyword, arrays render as `[a, b, ...]`.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => quote_string(s),
            Value::Array(items) => {
                let rendered = items
                    .iter()
                    .map(Value::to_literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", rendered)
            }
        }
    }

    /// Upper-case string content; other values are returned unchanged.
    pub fn to_uppercase(&self) -> Value {
        match self {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A caller-supplied argument, before conversion to a bindable `Value`.
///
/// In JSON an enum variant is written `{"enum": "NAME"}`, a collection as an
/// array, and anything else as a plain JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Enum {
        #[serde(rename = "enum")]
        name: String,
    },
    Collection(Vec<Argument>),
    Value(Value),
}

impl Argument {
    pub fn enum_variant(name: impl Into<String>) -> Self {
        Argument::Enum { name: name.into() }
    }

    pub fn collection<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Argument>,
    {
        Argument::Collection(items.into_iter().map(Into::into).collect())
    }

    /// Shape name used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Argument::Enum { .. } => "enum",
            Argument::Collection(_) => "collection",
            Argument::Value(v) => v.type_name(),
        }
    }

    /// Convert for a scalar comparison. Enum variants become their name.
    pub fn into_value(self) -> Value {
        match self {
            Argument::Enum { name } => Value::String(name),
            Argument::Collection(items) => {
                Value::Array(items.into_iter().map(Argument::into_value).collect())
            }
            Argument::Value(v) => v,
        }
    }

    /// Convert for set membership: always a single array value.
    ///
    /// Collections are flattened into one array, a lone scalar becomes a
    /// one-element array.
    pub fn into_array(self) -> Result<Value, CompileError> {
        match self {
            Argument::Collection(items) => Ok(Value::Array(
                items.into_iter().map(Argument::into_value).collect(),
            )),
            Argument::Value(Value::Array(items)) => Ok(Value::Array(items)),
            Argument::Value(Value::Null) => Err(CompileError::illegal(
                "set membership requires a collection argument, got null",
            )),
            scalar => Ok(Value::Array(vec![scalar.into_value()])),
        }
    }

    /// Convert for a pattern-matching function. Null becomes the empty pattern.
    pub fn into_pattern(self) -> Result<Value, CompileError> {
        match self {
            Argument::Value(Value::Null) => Ok(Value::String(String::new())),
            Argument::Value(Value::String(s)) => Ok(Value::String(s)),
            Argument::Value(Value::Bool(b)) => Ok(Value::String(b.to_string())),
            Argument::Value(Value::Int(i)) => Ok(Value::String(i.to_string())),
            Argument::Value(Value::Float(f)) => Ok(Value::String(f.to_string())),
            Argument::Enum { name } => Ok(Value::String(name)),
            other => Err(CompileError::illegal(format!(
                "pattern argument must be a scalar, got {}",
                other.shape()
            ))),
        }
    }
}

impl From<Value> for Argument {
    fn from(v: Value) -> Self {
        Argument::Value(v)
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Value(s.into())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::Value(s.into())
    }
}

impl From<i32> for Argument {
    fn from(n: i32) -> Self {
        Argument::Value(n.into())
    }
}

impl From<i64> for Argument {
    fn from(n: i64) -> Self {
        Argument::Value(n.into())
    }
}

impl From<f64> for Argument {
    fn from(f: f64) -> Self {
        Argument::Value(f.into())
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Argument::Value(b.into())
    }
}
