use tracing::{debug, trace};

use super::{Ops, Predicate};
use crate::error::CompileError;
use crate::mapping::{FieldPath, FieldPathResolver};
use crate::query::criteria::{CriterionBuilder, Operand, Operator, QueryCriteria};
use crate::query::value::{Argument, Value};

/// Lowers a [`Predicate`] tree into [`QueryCriteria`] in one post-order walk.
pub struct PredicateTranslator<'a> {
    fields: &'a dyn FieldPathResolver,
}

/// A binary comparison normalized to field-first order.
struct Comparison {
    field: FieldPath,
    constant: Argument,
    /// The constant was written on the left.
    swapped: bool,
}

impl<'a> PredicateTranslator<'a> {
    pub fn new(fields: &'a dyn FieldPathResolver) -> Self {
        Self { fields }
    }

    pub fn translate(&self, predicate: &Predicate) -> Result<QueryCriteria, CompileError> {
        match predicate {
            Predicate::Operation { op, args } => self.operation(*op, args),
            other => {
                debug!(shape = other.shape(), "predicate root is not an operation");
                Err(CompileError::unsupported(
                    "BOOLEAN",
                    format!("({})", other.shape()),
                ))
            }
        }
    }

    fn operation(&self, op: Ops, args: &[Predicate]) -> Result<QueryCriteria, CompileError> {
        trace!(op = op.name(), arity = args.len(), "translating operation");
        match op {
            Ops::And | Ops::Or => self.junction(op, args),
            Ops::Not => self.negation(args),

            Ops::Eq => self.simple(op, args, Operator::Eq),
            Ops::Ne => self.simple(op, args, Operator::Ne),
            Ops::Lt => self.ordered(op, args, Operator::Lt, Operator::Gt),
            Ops::Loe => self.ordered(op, args, Operator::Lte, Operator::Gte),
            Ops::Gt => self.ordered(op, args, Operator::Gt, Operator::Lt),
            Ops::Goe => self.ordered(op, args, Operator::Gte, Operator::Lte),

            Ops::Like => self.pattern(op, args, Operator::Like, false),
            Ops::LikeIc => self.pattern(op, args, Operator::Like, true),
            Ops::StartsWith => self.pattern(op, args, Operator::StartsWith, false),
            Ops::StartsWithIc => self.pattern(op, args, Operator::StartsWith, true),
            Ops::EndsWith => self.pattern(op, args, Operator::EndsWith, false),
            Ops::EndsWithIc => self.pattern(op, args, Operator::EndsWith, true),
            Ops::StringContains => self.pattern(op, args, Operator::Contains, false),
            Ops::StringContainsIc => self.pattern(op, args, Operator::Contains, true),
            Ops::EqIgnoreCase => self.pattern(op, args, Operator::Eq, true),
            Ops::Matches => self.pattern(op, args, Operator::Regex, false),

            Ops::Between => self.between(op, args),
            Ops::In => self.membership(op, args, Operator::In, Operator::Eq),
            Ops::NotIn => self.membership(op, args, Operator::NotIn, Operator::Ne),

            Ops::IsNull => Ok(self.unary(op, args)?.is_null()),
            Ops::IsNotNull => Ok(self.unary(op, args)?.is_not_null()),
            Ops::ColIsEmpty => Ok(self.unary(op, args)?.is_not_valued()),
            Ops::StringIsEmpty => {
                let field = self.unary_field(op, args)?;
                Ok(CriterionBuilder::new(field.clone())
                    .is_not_valued()
                    .or_field(field)
                    .is("")
                    .group())
            }

            Ops::MatchesIc | Ops::StringLength | Ops::ColSize | Ops::ContainsKey => {
                Err(self.unsupported(op, args))
            }
        }
    }

    fn unsupported(&self, op: Ops, args: &[Predicate]) -> CompileError {
        let shape = args
            .iter()
            .map(Predicate::shape)
            .collect::<Vec<_>>()
            .join(", ");
        debug!(op = op.name(), shape = %shape, "unsupported predicate operation");
        CompileError::unsupported(op.name(), format!("({})", shape))
    }

    /// `AND`/`OR` over two or more children.
    ///
    /// A translated child chaining with the other operator is parenthesized,
    /// a child of the same kind is flattened into the chain.
    fn junction(&self, op: Ops, args: &[Predicate]) -> Result<QueryCriteria, CompileError> {
        if args.len() < 2 {
            return Err(CompileError::illegal(format!(
                "{} requires at least two operands, got {}",
                op.name(),
                args.len()
            )));
        }

        let joiner = if op == Ops::And { Operator::And } else { Operator::Or };
        let mut result: Option<QueryCriteria> = None;
        for arg in args {
            let mut child = self.translate(arg)?;
            if child.operator().is_chain() && child.operator() != joiner {
                child = child.group();
            }
            result = Some(match result {
                None => child,
                Some(acc) if op == Ops::And => acc.and_with(child),
                Some(acc) => acc.or_with(child),
            });
        }
        result.ok_or_else(|| CompileError::illegal("empty junction"))
    }

    /// `NOT IN` is rewritten directly, anything else is negated.
    fn negation(&self, args: &[Predicate]) -> Result<QueryCriteria, CompileError> {
        match args {
            [Predicate::Operation { op: Ops::In, args }] => self.operation(Ops::NotIn, args),
            [child] => Ok(self.translate(child)?.negate()),
            _ => Err(self.unsupported(Ops::Not, args)),
        }
    }

    fn comparison(&self, op: Ops, args: &[Predicate]) -> Result<Comparison, CompileError> {
        match args {
            [Predicate::Path(path), Predicate::Constant(constant)] => Ok(Comparison {
                field: self.fields.resolve(path)?,
                constant: constant.clone(),
                swapped: false,
            }),
            [Predicate::Constant(constant), Predicate::Path(path)] => Ok(Comparison {
                field: self.fields.resolve(path)?,
                constant: constant.clone(),
                swapped: true,
            }),
            _ => Err(self.unsupported(op, args)),
        }
    }

    fn unary_field(&self, op: Ops, args: &[Predicate]) -> Result<FieldPath, CompileError> {
        match args {
            [Predicate::Path(path)] => self.fields.resolve(path),
            _ => Err(self.unsupported(op, args)),
        }
    }

    fn unary(&self, op: Ops, args: &[Predicate]) -> Result<CriterionBuilder, CompileError> {
        Ok(CriterionBuilder::new(self.unary_field(op, args)?))
    }

    /// Symmetric comparison; operand order does not matter.
    fn simple(
        &self,
        op: Ops,
        args: &[Predicate],
        operator: Operator,
    ) -> Result<QueryCriteria, CompileError> {
        let cmp = self.comparison(op, args)?;
        CriterionBuilder::new(cmp.field)
            .compare(operator, vec![Operand::Value(cmp.constant.into_value())])
    }

    /// Ordering comparison; a constant on the left flips the operator.
    fn ordered(
        &self,
        op: Ops,
        args: &[Predicate],
        operator: Operator,
        flipped: Operator,
    ) -> Result<QueryCriteria, CompileError> {
        let cmp = self.comparison(op, args)?;
        let operator = if cmp.swapped { flipped } else { operator };
        CriterionBuilder::new(cmp.field)
            .compare(operator, vec![Operand::Value(cmp.constant.into_value())])
    }

    /// String matching. Case-insensitive variants fold the field with `upper`
    /// and upper-case the constant itself.
    fn pattern(
        &self,
        op: Ops,
        args: &[Predicate],
        operator: Operator,
        ignore_case: bool,
    ) -> Result<QueryCriteria, CompileError> {
        let cmp = self.comparison(op, args)?;
        if cmp.swapped {
            return Err(self.unsupported(op, args));
        }

        let builder = CriterionBuilder::new(cmp.field);
        if ignore_case {
            let value = cmp.constant.into_pattern()?.to_uppercase();
            builder.upper().compare(operator, vec![Operand::Value(value)])
        } else {
            builder.compare(operator, vec![Operand::Value(cmp.constant.into_value())])
        }
    }

    fn between(&self, op: Ops, args: &[Predicate]) -> Result<QueryCriteria, CompileError> {
        match args {
            [Predicate::Path(path), Predicate::Constant(low), Predicate::Constant(high)] => {
                Ok(CriterionBuilder::new(self.fields.resolve(path)?)
                    .between(low.clone().into_value(), high.clone().into_value()))
            }
            _ => Err(self.unsupported(op, args)),
        }
    }

    /// Set membership. A scalar constant degrades to (in)equality.
    fn membership(
        &self,
        op: Ops,
        args: &[Predicate],
        operator: Operator,
        scalar: Operator,
    ) -> Result<QueryCriteria, CompileError> {
        let cmp = self.comparison(op, args)?;
        let builder = CriterionBuilder::new(cmp.field);
        match cmp.constant {
            constant @ (Argument::Collection(_) | Argument::Value(Value::Array(_))) => {
                builder.compare(operator, vec![Operand::Value(constant.into_array()?)])
            }
            constant => builder.compare(scalar, vec![Operand::Value(constant.into_value())]),
        }
    }
}
