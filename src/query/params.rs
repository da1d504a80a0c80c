//! Placeholder allocation and bound-value collection.
//!
//! One [`ParamBinder`] is created per top-level compile call and threaded by
//! `&mut` through every recursive rendering step. Placeholder tokens are only
//! meaningful inside the statement produced by that same binder.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::expression::Expression;
use super::value::Value;
use crate::error::CompileError;

/// How placeholders are written into statement text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `$1, $2, ...` with an ordered value list.
    #[default]
    Positional,
    /// `$name` tokens with a name to value map.
    Named,
}

/// Values to ship alongside the statement text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoundValues {
    Positional(Vec<Value>),
    Named(BTreeMap<String, Value>),
}

impl BoundValues {
    pub fn len(&self) -> usize {
        match self {
            BoundValues::Positional(values) => values.len(),
            BoundValues::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn positional(&self) -> Option<&[Value]> {
        match self {
            BoundValues::Positional(values) => Some(values),
            BoundValues::Named(_) => None,
        }
    }

    pub fn named(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            BoundValues::Named(values) => Some(values),
            BoundValues::Positional(_) => None,
        }
    }
}

/// Per-compile placeholder counter plus value buffer.
#[derive(Debug)]
pub struct ParamBinder {
    style: PlaceholderStyle,
    /// Next positional index; starts at 1 and only grows.
    counter: usize,
    /// Issued named tokens, in issue order.
    names: Vec<String>,
    used: HashSet<String>,
    values: Vec<Value>,
}

impl ParamBinder {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            counter: 1,
            names: Vec::new(),
            used: HashSet::new(),
            values: Vec::new(),
        }
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Allocate the next placeholder token.
    ///
    /// Positional tokens are `$` plus the pre-increment counter. Named tokens
    /// use `hint`, suffixed `_2`, `_3`, ... when the name is already taken.
    pub fn next(&mut self, hint: &str) -> String {
        match self.style {
            PlaceholderStyle::Positional => {
                let token = format!("${}", self.counter);
                self.counter += 1;
                token
            }
            PlaceholderStyle::Named => {
                let name = self.unique_name(hint);
                self.used.insert(name.clone());
                self.names.push(name.clone());
                format!("${}", name)
            }
        }
    }

    fn unique_name(&self, hint: &str) -> String {
        if !self.used.contains(hint) {
            return hint.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", hint, n);
            if !self.used.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Append a value to the buffer.
    pub fn bind(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Allocate a token and bind `value` to it in one step.
    pub fn push(&mut self, hint: &str, value: Value) -> Expression {
        let token = self.next(hint);
        self.bind(value);
        Expression::x(token)
    }

    /// Number of tokens issued so far.
    pub fn placeholder_count(&self) -> usize {
        match self.style {
            PlaceholderStyle::Positional => self.counter - 1,
            PlaceholderStyle::Named => self.names.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Close the binder and hand out the bound values.
    ///
    /// Fails with [`CompileError::BindingCountMismatch`] when the number of
    /// issued tokens differs from the number of bound values.
    pub fn finish(self) -> Result<BoundValues, CompileError> {
        let placeholders = self.placeholder_count();
        if placeholders != self.values.len() {
            return Err(CompileError::BindingCountMismatch {
                placeholders,
                values: self.values.len(),
            });
        }

        Ok(match self.style {
            PlaceholderStyle::Positional => BoundValues::Positional(self.values),
            PlaceholderStyle::Named => {
                BoundValues::Named(self.names.into_iter().zip(self.values).collect())
            }
        })
    }
}

/// Turns an operand value into statement text.
///
/// [`ParamBinder`] emits placeholders, [`LiteralRenderer`] inlines literals.
pub trait ValueRenderer {
    fn render(&mut self, hint: &str, value: Value) -> Expression;
}

impl ValueRenderer for ParamBinder {
    fn render(&mut self, hint: &str, value: Value) -> Expression {
        self.push(hint, value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralRenderer;

impl ValueRenderer for LiteralRenderer {
    fn render(&mut self, _hint: &str, value: Value) -> Expression {
        Expression::literal(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_tokens_start_at_one() {
        let mut binder = ParamBinder::new(PlaceholderStyle::Positional);
        assert_eq!(binder.next("a"), "$1");
        assert_eq!(binder.next("a"), "$2");
        assert_eq!(binder.placeholder_count(), 2);
    }

    #[test]
    fn test_positional_finish() {
        let mut binder = ParamBinder::new(PlaceholderStyle::Positional);
        binder.push("name", Value::from("Bubba"));
        binder.push("age", Value::Int(21));
        let values = binder.finish().unwrap();
        assert_eq!(
            values,
            BoundValues::Positional(vec![Value::from("Bubba"), Value::Int(21)])
        );
    }

    #[test]
    fn test_named_tokens_are_deduplicated() {
        let mut binder = ParamBinder::new(PlaceholderStyle::Named);
        assert_eq!(binder.push("age", Value::Int(1)).as_str(), "$age");
        assert_eq!(binder.push("age", Value::Int(2)).as_str(), "$age_2");
        assert_eq!(binder.push("age_2", Value::Int(3)).as_str(), "$age_2_2");

        let values = binder.finish().unwrap();
        let named = values.named().unwrap();
        assert_eq!(named.get("age"), Some(&Value::Int(1)));
        assert_eq!(named.get("age_2"), Some(&Value::Int(2)));
        assert_eq!(named.get("age_2_2"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_unbound_token_is_a_mismatch() {
        let mut binder = ParamBinder::new(PlaceholderStyle::Positional);
        binder.next("a");
        let err = binder.finish().unwrap_err();
        assert_eq!(
            err,
            CompileError::BindingCountMismatch {
                placeholders: 1,
                values: 0
            }
        );
    }

    #[test]
    fn test_value_without_token_is_a_mismatch() {
        let mut binder = ParamBinder::new(PlaceholderStyle::Named);
        binder.bind(Value::Null);
        assert!(binder.finish().is_err());
    }

    #[test]
    fn test_literal_renderer_inlines() {
        let mut renderer = LiteralRenderer;
        assert_eq!(renderer.render("x", Value::from("a")).as_str(), "\"a\"");
        assert_eq!(renderer.render("x", Value::Null).as_str(), "null");
    }

    #[test]
    fn test_bound_values_serialize_plainly() {
        let values = BoundValues::Positional(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[1,"x"]"#);
    }
}
