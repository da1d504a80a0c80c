//! Query compilation.
//!
//! Two front ends feed the same back end:
//!
//! 1. **Predicate trees** ([`predicate`]) from an expression-based query API
//! 2. **Derived method names** ([`derived`]) such as `findByFirstnameAndAge`
//!
//! Both lower into [`criteria::QueryCriteria`], which [`statement::Query`]
//! renders into statement text through [`expression::Expression`] while a
//! per-compile [`params::ParamBinder`] allocates placeholders. The result is a
//! [`CompiledQuery`]: text and bound values, always shipped together.

pub mod criteria;
pub mod derived;
pub mod escape;
pub mod expression;
pub mod params;
pub mod predicate;
pub mod statement;
pub mod value;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::mapping::{FieldPathResolver, PropertyTypeResolver};
use derived::DerivedQuery;
use params::{BoundValues, PlaceholderStyle};
use predicate::PredicateQuery;
use statement::Query;

/// Statement text plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub statement: String,
    pub params: BoundValues,
    pub style: PlaceholderStyle,
}

impl CompiledQuery {
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Restricts results to one entity type: `` `<key>` = "<alias>" ``.
#[derive(Debug, Clone, Copy)]
pub struct TypeFilter<'a> {
    pub key: &'a str,
    pub alias: &'a str,
}

/// Everything a compile call reads but never mutates.
///
/// Shared freely across threads; each compile creates its own binder.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    pub bucket: &'a str,
    pub style: PlaceholderStyle,
    pub fields: &'a dyn FieldPathResolver,
    pub types: &'a dyn PropertyTypeResolver,
    pub type_filter: Option<TypeFilter<'a>>,
}

impl<'a> CompileContext<'a> {
    pub fn new(
        bucket: &'a str,
        fields: &'a dyn FieldPathResolver,
        types: &'a dyn PropertyTypeResolver,
    ) -> Self {
        Self {
            bucket,
            style: PlaceholderStyle::Positional,
            fields,
            types,
            type_filter: None,
        }
    }

    pub fn with_style(mut self, style: PlaceholderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_type_filter(mut self, key: &'a str, alias: &'a str) -> Self {
        self.type_filter = Some(TypeFilter { key, alias });
        self
    }
}

/// A front-end request that can be lowered into a [`Query`].
#[enum_dispatch]
pub trait QuerySource {
    /// Name of the entity the request targets.
    fn entity(&self) -> &str;

    fn build_query(&self, ctx: &CompileContext<'_>) -> Result<Query, CompileError>;
}

/// Serialized compile request, tagged by front end:
///
/// ```json
/// { "kind": "derived", "entity": "Person", "method": "findByAgeLessThan", "args": [21] }
/// ```
#[enum_dispatch(QuerySource)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryRequest {
    Predicate(PredicateQuery),
    Derived(DerivedQuery),
}

impl QueryRequest {
    pub fn compile(&self, ctx: &CompileContext<'_>) -> Result<CompiledQuery, CompileError> {
        self.build_query(ctx)?.compile(ctx)
    }

    /// Data statement plus a parallel count statement over the same criteria.
    pub fn compile_with_count(
        &self,
        ctx: &CompileContext<'_>,
    ) -> Result<(CompiledQuery, CompiledQuery), CompileError> {
        let query = self.build_query(ctx)?;
        Ok((query.compile(ctx)?, query.compile_count(ctx)?))
    }
}
