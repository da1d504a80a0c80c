//! Statement assembly around a compiled criteria.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::criteria::QueryCriteria;
use super::expression::Expression;
use super::params::ParamBinder;
use super::{CompileContext, CompiledQuery};
use crate::error::CompileError;

/// What the statement returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Full documents with their id and cas.
    #[default]
    Entity,
    Count,
    /// Id of the first match, if any.
    Exists,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY term on a logical property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub ignore_case: bool,
}

impl Order {
    pub fn asc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: Direction::Asc,
            ignore_case: false,
        }
    }

    pub fn desc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: Direction::Desc,
            ignore_case: false,
        }
    }

    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u64,
    pub size: u64,
    /// Replaces any sort derived from the method name when non-empty.
    #[serde(default)]
    pub sort: Vec<Order>,
}

impl Page {
    pub fn new(number: u64, size: u64) -> Self {
        Self {
            number,
            size,
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, sort: Vec<Order>) -> Self {
        self.sort = sort;
        self
    }

    pub fn offset(&self) -> u64 {
        self.number.saturating_mul(self.size)
    }
}

/// A fully resolved query, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    criteria: Option<QueryCriteria>,
    projection: Projection,
    distinct: bool,
    sort: Vec<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Query {
    pub fn new(criteria: Option<QueryCriteria>) -> Self {
        Self {
            criteria,
            projection: Projection::Entity,
            distinct: false,
            sort: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_sort(mut self, sort: Vec<Order>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: Option<u64>) -> Self {
        self.offset = offset;
        self
    }

    /// Apply a page request. It overrides limit and offset, and the sort when
    /// the page carries one.
    pub fn with_page(mut self, page: &Page) -> Self {
        self.limit = Some(page.size);
        self.offset = Some(page.offset());
        if !page.sort.is_empty() {
            self.sort = page.sort.clone();
        }
        self
    }

    pub fn criteria(&self) -> Option<&QueryCriteria> {
        self.criteria.as_ref()
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn sort(&self) -> &[Order] {
        &self.sort
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Render the statement with a fresh binder.
    pub fn compile(&self, ctx: &CompileContext<'_>) -> Result<CompiledQuery, CompileError> {
        let mut binder = ParamBinder::new(ctx.style);

        let mut filter = match &self.criteria {
            Some(criteria) => Some(criteria.export_bound(&mut binder)?),
            None => None,
        };
        if let Some(type_filter) = &ctx.type_filter {
            let by_type = Expression::i(type_filter.key).eq(&Expression::s(type_filter.alias));
            filter = Some(match filter {
                Some(criteria) => Expression::paren(&criteria).and(&by_type),
                None => by_type,
            });
        }

        let mut statement = self.head(ctx.bucket);
        if let Some(filter) = &filter {
            statement = statement.where_(filter);
        }

        match self.projection {
            Projection::Entity => {
                if !self.sort.is_empty() {
                    statement = statement.order_by(&self.orderings(ctx)?);
                }
                if let Some(limit) = self.limit {
                    statement = statement.limit(limit);
                }
                if let Some(offset) = self.offset {
                    statement = statement.offset(offset);
                }
            }
            Projection::Exists => statement = statement.limit(1),
            Projection::Delete => {
                if let Some(limit) = self.limit {
                    statement = statement.limit(limit);
                }
            }
            Projection::Count => {}
        }

        let params = binder.finish()?;
        debug!(
            statement = %statement,
            placeholders = params.len(),
            style = ?ctx.style,
            "compiled statement"
        );

        Ok(CompiledQuery {
            statement: statement.into_string(),
            params,
            style: ctx.style,
        })
    }

    /// Count statement over the same criteria, with its own binder.
    pub fn compile_count(&self, ctx: &CompileContext<'_>) -> Result<CompiledQuery, CompileError> {
        self.clone()
            .with_projection(Projection::Count)
            .compile(ctx)
    }

    fn head(&self, bucket: &str) -> Expression {
        let meta = Expression::meta(bucket);
        match self.projection {
            Projection::Entity => {
                let columns = [
                    Expression::path(&[meta.clone(), Expression::x("id")]).as_("__id"),
                    Expression::path(&[meta, Expression::x("cas")]).as_("__cas"),
                    Expression::path(&[Expression::i(bucket), Expression::x("*")]),
                ];
                if self.distinct {
                    Expression::select_distinct(&columns).from(bucket)
                } else {
                    Expression::select(&columns).from(bucket)
                }
            }
            Projection::Count => {
                Expression::select(&[Expression::count(&Expression::x("*")).as_("count")])
                    .from(bucket)
            }
            Projection::Exists => {
                Expression::select(&[Expression::path(&[meta, Expression::x("id")]).as_("__id")])
                    .from(bucket)
            }
            Projection::Delete => Expression::delete_from(bucket),
        }
    }

    fn orderings(&self, ctx: &CompileContext<'_>) -> Result<Vec<Expression>, CompileError> {
        self.sort
            .iter()
            .map(|order| {
                let field = ctx.fields.resolve(&order.property)?;
                let mut key = Expression::x(field.as_str());
                if order.ignore_case {
                    key = Expression::lower(&Expression::tostring(&key));
                }
                Ok(match order.direction {
                    Direction::Asc => key.asc(),
                    Direction::Desc => key.desc(),
                })
            })
            .collect()
    }
}
