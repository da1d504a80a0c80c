use tracing::{debug, trace};

use super::{IgnoreCase, Part, PartTree, PartType};
use crate::error::CompileError;
use crate::mapping::{FieldPath, FieldPathResolver, PropertyTypeResolver};
use crate::query::criteria::{Conversion, CriterionBuilder, Operand, Operator, QueryCriteria};
use crate::query::statement::{Order, Page, Projection, Query};
use crate::query::value::Argument;

/// Lowers a [`PartTree`] into criteria with one deferred operand per argument.
pub struct PartTreeCompiler<'a> {
    fields: &'a dyn FieldPathResolver,
    types: &'a dyn PropertyTypeResolver,
}

impl<'a> PartTreeCompiler<'a> {
    pub fn new(fields: &'a dyn FieldPathResolver, types: &'a dyn PropertyTypeResolver) -> Self {
        Self { fields, types }
    }

    /// Validate every part and sort property; no arguments are consumed yet.
    pub fn prepare(&self, tree: &PartTree) -> Result<PreparedQuery, CompileError> {
        let mut criteria: Option<QueryCriteria> = None;

        for group in &tree.or_groups {
            let mut conjunction: Option<QueryCriteria> = None;
            for part in group {
                let next = self.compile_part(part)?;
                conjunction = Some(match conjunction {
                    Some(left) => left.and_with(next),
                    None => next,
                });
            }
            if let Some(conjunction) = conjunction {
                criteria = Some(match criteria {
                    Some(left) => left.or_with(conjunction),
                    None => conjunction,
                });
            }
        }

        for order in &tree.sort {
            self.fields.resolve(&order.property)?;
        }

        let argument_count = criteria.as_ref().map_or(0, QueryCriteria::deferred_count);
        trace!(argument_count, "prepared derived query");

        Ok(PreparedQuery {
            criteria,
            argument_count,
            projection: tree.projection,
            distinct: tree.distinct,
            max_results: tree.max_results,
            sort: tree.sort.clone(),
        })
    }

    /// Prepare and bind in one step.
    pub fn compile(&self, tree: &PartTree, args: Vec<Argument>) -> Result<Query, CompileError> {
        self.prepare(tree)?.bind(args, None)
    }

    pub fn compile_part(&self, part: &Part) -> Result<QueryCriteria, CompileError> {
        let field = self.fields.resolve(&part.property)?;

        let scalar = || Operand::Deferred(Conversion::Scalar);
        let (operator, operands) = match part.kind {
            PartType::SimpleProperty => (Operator::Eq, vec![scalar()]),
            PartType::NegatingSimpleProperty => (Operator::Ne, vec![scalar()]),
            PartType::LessThan | PartType::Before => (Operator::Lt, vec![scalar()]),
            PartType::LessThanEqual => (Operator::Lte, vec![scalar()]),
            PartType::GreaterThan | PartType::After => (Operator::Gt, vec![scalar()]),
            PartType::GreaterThanEqual => (Operator::Gte, vec![scalar()]),
            PartType::Between => (Operator::Between, vec![scalar(), scalar()]),
            PartType::IsNull => (Operator::IsNull, Vec::new()),
            PartType::IsNotNull => (Operator::IsNotNull, Vec::new()),
            PartType::Like => (Operator::Like, vec![scalar()]),
            PartType::NotLike => (Operator::NotLike, vec![scalar()]),
            PartType::StartingWith => (Operator::StartsWith, vec![scalar()]),
            PartType::EndingWith => (Operator::EndsWith, vec![scalar()]),
            PartType::Containing => (Operator::Contains, vec![scalar()]),
            PartType::NotContaining => (Operator::NotContains, vec![scalar()]),
            PartType::In => (Operator::In, vec![Operand::Deferred(Conversion::Array)]),
            PartType::NotIn => (Operator::NotIn, vec![Operand::Deferred(Conversion::Array)]),
            PartType::True => (Operator::True, Vec::new()),
            PartType::False => (Operator::False, Vec::new()),
            PartType::Regex => (Operator::Regex, vec![Operand::Deferred(Conversion::Pattern)]),
            PartType::Exists => (Operator::IsNotMissing, Vec::new()),
            PartType::Near | PartType::Within | PartType::IsEmpty | PartType::IsNotEmpty => {
                debug!(kind = part.kind.name(), property = %part.property, "no template for part");
                return Err(CompileError::unsupported(
                    part.kind.name(),
                    format!("({})", part.property),
                ));
            }
        };

        let mut builder = CriterionBuilder::new(field.clone());
        let foldable = !matches!(
            operator,
            Operator::In | Operator::NotIn | Operator::Regex
        );
        if self.folds(part, &field)? && foldable {
            builder = builder.ignore_case();
        }
        builder.compare(operator, operands)
    }

    fn folds(&self, part: &Part, field: &FieldPath) -> Result<bool, CompileError> {
        match part.ignore_case {
            IgnoreCase::Never => Ok(false),
            IgnoreCase::WhenPossible => Ok(self.types.type_of(field)?.is_textual()),
            IgnoreCase::Always => {
                let kind = self.types.type_of(field)?;
                if kind.is_textual() {
                    Ok(true)
                } else {
                    Err(CompileError::illegal(format!(
                        "Part {} must be of type String but was {}",
                        field,
                        kind.name()
                    )))
                }
            }
        }
    }
}

/// A validated derived query waiting for its method-call arguments.
///
/// Immutable once built, so one instance can be bound concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    criteria: Option<QueryCriteria>,
    argument_count: usize,
    projection: Projection,
    distinct: bool,
    max_results: Option<u64>,
    sort: Vec<Order>,
}

impl PreparedQuery {
    pub fn argument_count(&self) -> usize {
        self.argument_count
    }

    pub fn criteria(&self) -> Option<&QueryCriteria> {
        self.criteria.as_ref()
    }

    /// Fill every deferred operand from `args`, in part order. A page
    /// overrides the method-name limit and, when it carries one, the sort.
    pub fn bind(&self, args: Vec<Argument>, page: Option<&Page>) -> Result<Query, CompileError> {
        if args.len() != self.argument_count {
            return Err(CompileError::illegal(format!(
                "method expects {} argument(s) but {} were supplied",
                self.argument_count,
                args.len()
            )));
        }

        let criteria = match &self.criteria {
            Some(criteria) => Some(criteria.resolved(&mut args.into_iter())?),
            None => None,
        };

        let mut query = Query::new(criteria)
            .with_projection(self.projection)
            .with_distinct(self.distinct)
            .with_sort(self.sort.clone())
            .with_limit(self.max_results);
        if let Some(page) = page {
            query = query.with_page(page);
        }
        Ok(query)
    }
}
