//! Derived-method front end.
//!
//! A repository method name such as `findByLastnameAndAgeBetween` decodes into
//! a [`PartTree`]: OR-groups of AND-ed [`Part`]s plus subject and ordering
//! information. [`PartTreeCompiler`] validates the tree against the mapping
//! and yields a [`PreparedQuery`] whose operands are bound from method-call
//! arguments at invocation time.

mod compiler;
mod method_name;

pub use compiler::{PartTreeCompiler, PreparedQuery};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::statement::{Order, Page, Projection, Query};
use super::value::Argument;
use super::{CompileContext, QuerySource};
use crate::error::CompileError;

/// Operator kind of a decoded part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    SimpleProperty,
    NegatingSimpleProperty,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Before,
    After,
    Between,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
    StartingWith,
    EndingWith,
    Containing,
    NotContaining,
    In,
    NotIn,
    True,
    False,
    Regex,
    Exists,
    Near,
    Within,
    IsEmpty,
    IsNotEmpty,
}

impl PartType {
    /// Matching precedence: longer keywords sharing a suffix with shorter
    /// ones come first, the keyword-less `SimpleProperty` comes last.
    pub(crate) const ALL: [PartType; 27] = [
        PartType::IsNotNull,
        PartType::IsNull,
        PartType::Between,
        PartType::LessThan,
        PartType::LessThanEqual,
        PartType::GreaterThan,
        PartType::GreaterThanEqual,
        PartType::Before,
        PartType::After,
        PartType::NotLike,
        PartType::Like,
        PartType::StartingWith,
        PartType::EndingWith,
        PartType::IsNotEmpty,
        PartType::IsEmpty,
        PartType::NotContaining,
        PartType::Containing,
        PartType::NotIn,
        PartType::In,
        PartType::Near,
        PartType::Within,
        PartType::Regex,
        PartType::Exists,
        PartType::True,
        PartType::False,
        PartType::NegatingSimpleProperty,
        PartType::SimpleProperty,
    ];

    /// Method-name keywords that select this part type.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            PartType::SimpleProperty => &["Is", "Equals"],
            PartType::NegatingSimpleProperty => &["IsNot", "Not"],
            PartType::LessThan => &["IsLessThan", "LessThan"],
            PartType::LessThanEqual => &["IsLessThanEqual", "LessThanEqual"],
            PartType::GreaterThan => &["IsGreaterThan", "GreaterThan"],
            PartType::GreaterThanEqual => &["IsGreaterThanEqual", "GreaterThanEqual"],
            PartType::Before => &["IsBefore", "Before"],
            PartType::After => &["IsAfter", "After"],
            PartType::Between => &["IsBetween", "Between"],
            PartType::IsNull => &["IsNull", "Null"],
            PartType::IsNotNull => &["IsNotNull", "NotNull"],
            PartType::Like => &["IsLike", "Like"],
            PartType::NotLike => &["IsNotLike", "NotLike"],
            PartType::StartingWith => &["IsStartingWith", "StartingWith", "StartsWith"],
            PartType::EndingWith => &["IsEndingWith", "EndingWith", "EndsWith"],
            PartType::Containing => &["IsContaining", "Containing", "Contains"],
            PartType::NotContaining => &["IsNotContaining", "NotContaining", "NotContains"],
            PartType::In => &["IsIn", "In"],
            PartType::NotIn => &["IsNotIn", "NotIn"],
            PartType::True => &["IsTrue", "True"],
            PartType::False => &["IsFalse", "False"],
            PartType::Regex => &["MatchesRegex", "Matches", "Regex"],
            PartType::Exists => &["Exists"],
            PartType::Near => &["IsNear", "Near"],
            PartType::Within => &["IsWithin", "Within"],
            PartType::IsEmpty => &["IsEmpty", "Empty"],
            PartType::IsNotEmpty => &["IsNotEmpty", "NotEmpty"],
        }
    }

    /// Runtime arguments consumed by one part of this type.
    pub fn argument_count(self) -> usize {
        match self {
            PartType::Between => 2,
            PartType::IsNull
            | PartType::IsNotNull
            | PartType::True
            | PartType::False
            | PartType::Exists
            | PartType::IsEmpty
            | PartType::IsNotEmpty => 0,
            _ => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PartType::SimpleProperty => "SIMPLE_PROPERTY",
            PartType::NegatingSimpleProperty => "NEGATING_SIMPLE_PROPERTY",
            PartType::LessThan => "LESS_THAN",
            PartType::LessThanEqual => "LESS_THAN_EQUAL",
            PartType::GreaterThan => "GREATER_THAN",
            PartType::GreaterThanEqual => "GREATER_THAN_EQUAL",
            PartType::Before => "BEFORE",
            PartType::After => "AFTER",
            PartType::Between => "BETWEEN",
            PartType::IsNull => "IS_NULL",
            PartType::IsNotNull => "IS_NOT_NULL",
            PartType::Like => "LIKE",
            PartType::NotLike => "NOT_LIKE",
            PartType::StartingWith => "STARTING_WITH",
            PartType::EndingWith => "ENDING_WITH",
            PartType::Containing => "CONTAINING",
            PartType::NotContaining => "NOT_CONTAINING",
            PartType::In => "IN",
            PartType::NotIn => "NOT_IN",
            PartType::True => "TRUE",
            PartType::False => "FALSE",
            PartType::Regex => "REGEX",
            PartType::Exists => "EXISTS",
            PartType::Near => "NEAR",
            PartType::Within => "WITHIN",
            PartType::IsEmpty => "IS_EMPTY",
            PartType::IsNotEmpty => "IS_NOT_EMPTY",
        }
    }
}

/// Case-insensitivity requested for a part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IgnoreCase {
    #[default]
    Never,
    /// Fold string fields, compare anything else as-is.
    WhenPossible,
    /// Fold, and reject non-string fields.
    Always,
}

/// One decoded comparison: operator kind, logical property path, case policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub kind: PartType,
    pub property: String,
    pub ignore_case: IgnoreCase,
}

impl Part {
    pub fn new(kind: PartType, property: &str) -> Self {
        Self {
            kind,
            property: property.to_string(),
            ignore_case: IgnoreCase::Never,
        }
    }

    pub fn with_ignore_case(mut self, ignore_case: IgnoreCase) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

/// Decoded method name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartTree {
    pub projection: Projection,
    pub distinct: bool,
    /// `First<N>` / `Top<N>` limit.
    pub max_results: Option<u64>,
    /// OR-ed groups of AND-ed parts, in method-name order.
    pub or_groups: Vec<Vec<Part>>,
    pub sort: Vec<Order>,
}

impl PartTree {
    /// Tree of a single AND-group.
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            or_groups: if parts.is_empty() { Vec::new() } else { vec![parts] },
            ..Self::default()
        }
    }

    pub fn or(mut self, parts: Vec<Part>) -> Self {
        self.or_groups.push(parts);
        self
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.or_groups.iter().flatten()
    }

    /// Total runtime arguments the parts consume.
    pub fn argument_count(&self) -> usize {
        self.parts().map(|part| part.kind.argument_count()).sum()
    }
}

/// Compile request for the derived-method front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedQuery {
    pub entity: String,
    pub method: String,
    #[serde(default)]
    pub args: Vec<Argument>,
    #[serde(default)]
    pub page: Option<Page>,
}

impl QuerySource for DerivedQuery {
    fn entity(&self) -> &str {
        &self.entity
    }

    fn build_query(&self, ctx: &CompileContext<'_>) -> Result<Query, CompileError> {
        debug!(entity = %self.entity, method = %self.method, "deriving query");
        let tree = PartTree::parse(&self.method)?;
        let prepared = PartTreeCompiler::new(ctx.fields, ctx.types).prepare(&tree)?;
        prepared.bind(self.args.clone(), self.page.as_ref())
    }
}
