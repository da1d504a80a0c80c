//! Immutable text fragments for N1QL statements.
//!
//! An [`Expression`] wraps a finished piece of query text. Every composition
//! method borrows its inputs and returns a new expression, so a fragment can
//! feed both a data statement and a count statement built from the same
//! criteria.
//!
//! Predicate operators render lower-case (`and`, `like`, `is not null`), clause
//! keywords and statement-level functions render upper-case (`SELECT`,
//! `ORDER BY`, `META`, `LOWER`).

use std::fmt;

use super::escape::{quote_identifier, quote_string};
use super::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(String);

impl Expression {
    /// Raw text, taken verbatim.
    pub fn x(text: impl Into<String>) -> Self {
        Expression(text.into())
    }

    /// Backtick-quoted identifier.
    pub fn i(identifier: &str) -> Self {
        Expression(quote_identifier(identifier))
    }

    /// Double-quoted string literal.
    pub fn s(text: &str) -> Self {
        Expression(quote_string(text))
    }

    pub fn literal(value: &Value) -> Self {
        Expression(value.to_literal())
    }

    pub fn null() -> Self {
        Expression::x("null")
    }

    pub fn boolean(value: bool) -> Self {
        Expression::x(if value { "true" } else { "false" })
    }

    /// `` `parent`.`field` ``, or a deeper dotted path.
    pub fn path(segments: &[Expression]) -> Self {
        Expression(join(segments, "."))
    }

    /// `` META(`bucket`) ``
    pub fn meta(bucket: &str) -> Self {
        Expression(format!("META({})", quote_identifier(bucket)))
    }

    /// `COUNT(expr)`
    pub fn count(expr: &Expression) -> Self {
        Expression(format!("COUNT({})", expr.0))
    }

    /// `SELECT a, b`
    pub fn select(columns: &[Expression]) -> Self {
        Expression(format!("SELECT {}", join(columns, ", ")))
    }

    /// `SELECT DISTINCT a, b`
    pub fn select_distinct(columns: &[Expression]) -> Self {
        Expression(format!("SELECT DISTINCT {}", join(columns, ", ")))
    }

    /// `` DELETE FROM `bucket` ``
    pub fn delete_from(bucket: &str) -> Self {
        Expression(format!("DELETE FROM {}", quote_identifier(bucket)))
    }

    pub fn lower(expr: &Expression) -> Self {
        Expression(format!("LOWER({})", expr.0))
    }

    pub fn upper(expr: &Expression) -> Self {
        Expression(format!("UPPER({})", expr.0))
    }

    pub fn tostring(expr: &Expression) -> Self {
        Expression(format!("TOSTRING({})", expr.0))
    }

    /// Lower-case case fold used inside predicates: `lower(f)`.
    pub fn fold_lower(expr: &Expression) -> Self {
        Expression(format!("lower({})", expr.0))
    }

    /// Upper-case case fold used inside predicates: `upper(f)`.
    pub fn fold_upper(expr: &Expression) -> Self {
        Expression(format!("upper({})", expr.0))
    }

    /// `contains(haystack, needle)`
    pub fn contains(haystack: &Expression, needle: &Expression) -> Self {
        Expression(format!("contains({}, {})", haystack.0, needle.0))
    }

    /// `regexp_like(subject, pattern)`
    pub fn regexp_like(subject: &Expression, pattern: &Expression) -> Self {
        Expression(format!("regexp_like({}, {})", subject.0, pattern.0))
    }

    /// `not(expr)`
    pub fn not(expr: &Expression) -> Self {
        Expression(format!("not({})", expr.0))
    }

    /// `(expr)`
    pub fn paren(expr: &Expression) -> Self {
        Expression(format!("({})", expr.0))
    }

    fn infix(&self, op: &str, right: &Expression) -> Expression {
        Expression(format!("{} {} {}", self.0, op, right.0))
    }

    fn postfix(&self, op: &str) -> Expression {
        Expression(format!("{} {}", self.0, op))
    }

    pub fn and(&self, right: &Expression) -> Expression {
        self.infix("and", right)
    }

    pub fn or(&self, right: &Expression) -> Expression {
        self.infix("or", right)
    }

    pub fn eq(&self, right: &Expression) -> Expression {
        self.infix("=", right)
    }

    pub fn ne(&self, right: &Expression) -> Expression {
        self.infix("!=", right)
    }

    pub fn lt(&self, right: &Expression) -> Expression {
        self.infix("<", right)
    }

    pub fn lte(&self, right: &Expression) -> Expression {
        self.infix("<=", right)
    }

    pub fn gt(&self, right: &Expression) -> Expression {
        self.infix(">", right)
    }

    pub fn gte(&self, right: &Expression) -> Expression {
        self.infix(">=", right)
    }

    pub fn between(&self, low: &Expression, high: &Expression) -> Expression {
        Expression(format!("{} between {} and {}", self.0, low.0, high.0))
    }

    pub fn like(&self, pattern: &Expression) -> Expression {
        self.infix("like", pattern)
    }

    pub fn not_like(&self, pattern: &Expression) -> Expression {
        self.infix("not like", pattern)
    }

    pub fn in_(&self, values: &Expression) -> Expression {
        self.infix("in", values)
    }

    pub fn not_in(&self, values: &Expression) -> Expression {
        self.infix("not in", values)
    }

    /// String concatenation without padding: `a||b`.
    pub fn concat(&self, right: &Expression) -> Expression {
        Expression(format!("{}||{}", self.0, right.0))
    }

    pub fn is_null(&self) -> Expression {
        self.postfix("is null")
    }

    pub fn is_not_null(&self) -> Expression {
        self.postfix("is not null")
    }

    pub fn is_missing(&self) -> Expression {
        self.postfix("is missing")
    }

    pub fn is_not_missing(&self) -> Expression {
        self.postfix("is not missing")
    }

    pub fn is_valued(&self) -> Expression {
        self.postfix("is valued")
    }

    pub fn is_not_valued(&self) -> Expression {
        self.postfix("is not valued")
    }

    pub fn as_(&self, alias: &str) -> Expression {
        self.infix("AS", &Expression::x(alias))
    }

    pub fn asc(&self) -> Expression {
        self.postfix("ASC")
    }

    pub fn desc(&self) -> Expression {
        self.postfix("DESC")
    }

    pub fn from(&self, bucket: &str) -> Expression {
        self.infix("FROM", &Expression::i(bucket))
    }

    pub fn where_(&self, criteria: &Expression) -> Expression {
        self.infix("WHERE", criteria)
    }

    pub fn order_by(&self, orderings: &[Expression]) -> Expression {
        Expression(format!("{} ORDER BY {}", self.0, join(orderings, ", ")))
    }

    pub fn limit(&self, n: u64) -> Expression {
        Expression(format!("{} LIMIT {}", self.0, n))
    }

    pub fn offset(&self, n: u64) -> Expression {
        Expression(format!("{} OFFSET {}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn join(parts: &[Expression], separator: &str) -> String {
    parts
        .iter()
        .map(Expression::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
