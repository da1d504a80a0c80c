//! Predicate-tree front end.
//!
//! A [`Predicate`] is a generic boolean expression over field references and
//! constants, as produced by an expression-based query API. In JSON:
//!
//! ```json
//! {"operation": {"op": "and", "args": [
//!     {"operation": {"op": "eq", "args": [{"path": "firstname"}, {"constant": "Bubba"}]}},
//!     {"operation": {"op": "lt", "args": [{"constant": 21}, {"path": "age"}]}}
//! ]}}
//! ```

mod translator;

pub use translator::PredicateTranslator;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::statement::{Order, Page, Projection, Query};
use super::value::Argument;
use super::{CompileContext, QuerySource};
use crate::error::CompileError;

/// Operators of the predicate tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ops {
    Eq,
    Ne,
    Lt,
    Loe,
    Gt,
    Goe,
    Between,
    Like,
    LikeIc,
    StartsWith,
    StartsWithIc,
    EndsWith,
    EndsWithIc,
    StringContains,
    StringContainsIc,
    EqIgnoreCase,
    Matches,
    MatchesIc,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    StringIsEmpty,
    ColIsEmpty,
    And,
    Or,
    Not,
    StringLength,
    ColSize,
    ContainsKey,
}

impl Ops {
    pub fn name(self) -> &'static str {
        match self {
            Ops::Eq => "EQ",
            Ops::Ne => "NE",
            Ops::Lt => "LT",
            Ops::Loe => "LOE",
            Ops::Gt => "GT",
            Ops::Goe => "GOE",
            Ops::Between => "BETWEEN",
            Ops::Like => "LIKE",
            Ops::LikeIc => "LIKE_IC",
            Ops::StartsWith => "STARTS_WITH",
            Ops::StartsWithIc => "STARTS_WITH_IC",
            Ops::EndsWith => "ENDS_WITH",
            Ops::EndsWithIc => "ENDS_WITH_IC",
            Ops::StringContains => "STRING_CONTAINS",
            Ops::StringContainsIc => "STRING_CONTAINS_IC",
            Ops::EqIgnoreCase => "EQ_IGNORE_CASE",
            Ops::Matches => "MATCHES",
            Ops::MatchesIc => "MATCHES_IC",
            Ops::In => "IN",
            Ops::NotIn => "NOT_IN",
            Ops::IsNull => "IS_NULL",
            Ops::IsNotNull => "IS_NOT_NULL",
            Ops::StringIsEmpty => "STRING_IS_EMPTY",
            Ops::ColIsEmpty => "COL_IS_EMPTY",
            Ops::And => "AND",
            Ops::Or => "OR",
            Ops::Not => "NOT",
            Ops::StringLength => "STRING_LENGTH",
            Ops::ColSize => "COL_SIZE",
            Ops::ContainsKey => "CONTAINS_KEY",
        }
    }
}

/// Node of a predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Logical property path, resolved through the mapping.
    Path(String),
    Constant(Argument),
    Operation { op: Ops, args: Vec<Predicate> },
}

impl Predicate {
    pub fn path(path: &str) -> Self {
        Predicate::Path(path.to_string())
    }

    pub fn constant(value: impl Into<Argument>) -> Self {
        Predicate::Constant(value.into())
    }

    pub fn operation(op: Ops, args: Vec<Predicate>) -> Self {
        Predicate::Operation { op, args }
    }

    /// `self <op> constant`
    pub fn cmp(self, op: Ops, value: impl Into<Argument>) -> Self {
        Self::operation(op, vec![self, Self::constant(value)])
    }

    pub fn eq(self, value: impl Into<Argument>) -> Self {
        self.cmp(Ops::Eq, value)
    }

    pub fn ne(self, value: impl Into<Argument>) -> Self {
        self.cmp(Ops::Ne, value)
    }

    pub fn lt(self, value: impl Into<Argument>) -> Self {
        self.cmp(Ops::Lt, value)
    }

    pub fn gt(self, value: impl Into<Argument>) -> Self {
        self.cmp(Ops::Gt, value)
    }

    pub fn between(self, low: impl Into<Argument>, high: impl Into<Argument>) -> Self {
        Self::operation(
            Ops::Between,
            vec![self, Self::constant(low), Self::constant(high)],
        )
    }

    pub fn in_(self, values: impl Into<Argument>) -> Self {
        self.cmp(Ops::In, values)
    }

    pub fn is_null(self) -> Self {
        Self::operation(Ops::IsNull, vec![self])
    }

    pub fn and(self, other: Predicate) -> Self {
        Self::operation(Ops::And, vec![self, other])
    }

    pub fn or(self, other: Predicate) -> Self {
        Self::operation(Ops::Or, vec![self, other])
    }

    pub fn not(self) -> Self {
        Self::operation(Ops::Not, vec![self])
    }

    /// Shape name used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Predicate::Path(_) => "Path",
            Predicate::Constant(_) => "Constant",
            Predicate::Operation { .. } => "Operation",
        }
    }
}

/// Compile request for the predicate front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredicateQuery {
    pub entity: String,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
    #[serde(default)]
    pub projection: Projection,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub sort: Vec<Order>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub page: Option<Page>,
}

impl QuerySource for PredicateQuery {
    fn entity(&self) -> &str {
        &self.entity
    }

    fn build_query(&self, ctx: &CompileContext<'_>) -> Result<Query, CompileError> {
        debug!(entity = %self.entity, "translating predicate tree");
        let criteria = match &self.predicate {
            Some(predicate) => Some(PredicateTranslator::new(ctx.fields).translate(predicate)?),
            None => None,
        };

        let mut query = Query::new(criteria)
            .with_projection(self.projection)
            .with_distinct(self.distinct)
            .with_sort(self.sort.clone())
            .with_limit(self.limit)
            .with_offset(self.offset);
        if let Some(page) = &self.page {
            query = query.with_page(page);
        }
        Ok(query)
    }
}
