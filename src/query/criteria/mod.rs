//! Criteria model: field/operator/operand trees combined with `and`/`or`.
//!
//! Chains built with [`QueryCriteria::and`] and [`QueryCriteria::or`] are
//! strictly left-associative in call order and render without inserted
//! parentheses:
//!
//! ```
//! use n1ql_compiler::query::criteria::where_;
//!
//! let criteria = where_("name").is("Bubba").and("age").lt(21).or("country").is("Austria");
//! assert_eq!(
//!     criteria.export().unwrap(),
//!     r#"`name` = "Bubba" and `age` < 21 or `country` = "Austria""#
//! );
//! ```
//!
//! Explicit grouping goes through [`QueryCriteria::and_group`] and
//! [`QueryCriteria::or_group`], which parenthesize the spliced criteria.
//!
//! Negation never applies De Morgan's laws. A leaf with a semantic opposite
//! flips its operator, a `NOT` node unwraps, anything else renders as
//! `not(<node>)`.

mod operator;

pub use operator::Operator;

use super::expression::Expression;
use super::params::{LiteralRenderer, ParamBinder, ValueRenderer};
use super::value::{Argument, Value};
use crate::error::CompileError;
use crate::mapping::FieldPath;

/// Case folding applied to a field or to its compared values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFold {
    Lower,
    Upper,
}

impl CaseFold {
    fn apply(self, expr: &Expression) -> Expression {
        match self {
            CaseFold::Lower => Expression::fold_lower(expr),
            CaseFold::Upper => Expression::fold_upper(expr),
        }
    }
}

/// How a deferred runtime argument is converted once it is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Single comparison value; enum arguments become their name.
    Scalar,
    /// Set membership; collections flatten into one array value.
    Array,
    /// Pattern-matching function argument; null becomes the empty pattern.
    Pattern,
}

impl Conversion {
    fn apply(self, argument: Argument) -> Result<Value, CompileError> {
        match self {
            Conversion::Scalar => Ok(argument.into_value()),
            Conversion::Array => argument.into_array(),
            Conversion::Pattern => argument.into_pattern(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    /// Filled from the next runtime argument by [`QueryCriteria::resolved`].
    Deferred(Conversion),
    Criteria(Box<QueryCriteria>),
}

/// One node of a criteria tree.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCriteria {
    field: Option<FieldPath>,
    operator: Operator,
    operands: Vec<Operand>,
    negated: bool,
    field_fold: Option<CaseFold>,
    value_fold: Option<CaseFold>,
    grouped: bool,
}

/// Start a criteria on `key`.
///
/// Plain keys are backtick-quoted per segment, keys that are already quoted or
/// contain a function call are used verbatim.
pub fn where_(key: &str) -> CriterionBuilder {
    CriterionBuilder::new(FieldPath::from_key(key))
}

/// Wrap `criteria` in a `NOT` node.
pub fn not(criteria: QueryCriteria) -> QueryCriteria {
    QueryCriteria::node(Operator::Not, vec![Operand::Criteria(Box::new(criteria))])
}

/// Pending comparison on one field.
///
/// When created through [`QueryCriteria::and`] or [`QueryCriteria::or`] it also
/// carries the criteria built so far, which becomes the left operand.
#[derive(Debug, Clone)]
pub struct CriterionBuilder {
    field: FieldPath,
    field_fold: Option<CaseFold>,
    value_fold: Option<CaseFold>,
    chain: Option<(Operator, QueryCriteria)>,
}

impl CriterionBuilder {
    pub fn new(field: FieldPath) -> Self {
        Self {
            field,
            field_fold: None,
            value_fold: None,
            chain: None,
        }
    }

    /// Compare `upper(field)`. Values are left untouched.
    pub fn upper(mut self) -> Self {
        self.field_fold = Some(CaseFold::Upper);
        self
    }

    /// Compare `lower(field)`. Values are left untouched.
    pub fn lower(mut self) -> Self {
        self.field_fold = Some(CaseFold::Lower);
        self
    }

    /// Lower-case both the field and every compared value.
    pub fn ignore_case(mut self) -> Self {
        self.field_fold = Some(CaseFold::Lower);
        self.value_fold = Some(CaseFold::Lower);
        self
    }

    fn finish(self, operator: Operator, operands: Vec<Operand>) -> QueryCriteria {
        // Arrays and patterns are bound as-is.
        let value_fold = match operator {
            Operator::In | Operator::NotIn | Operator::Regex => None,
            _ => self.value_fold,
        };
        let leaf = QueryCriteria {
            field: Some(self.field),
            operator,
            operands,
            negated: false,
            field_fold: self.field_fold,
            value_fold,
            grouped: false,
        };
        match self.chain {
            Some((op, left)) => QueryCriteria::node(
                op,
                vec![
                    Operand::Criteria(Box::new(left)),
                    Operand::Criteria(Box::new(leaf)),
                ],
            ),
            None => leaf,
        }
    }

    fn value(self, operator: Operator, value: impl Into<Value>) -> QueryCriteria {
        self.finish(operator, vec![Operand::Value(value.into())])
    }

    /// Generic comparison with an explicit operand list.
    ///
    /// Rejects combinators, nested criteria operands and arity mismatches.
    pub fn compare(
        self,
        operator: Operator,
        operands: Vec<Operand>,
    ) -> Result<QueryCriteria, CompileError> {
        if operator.takes_criteria() {
            return Err(CompileError::illegal(format!(
                "{} is not a comparison operator",
                operator
            )));
        }
        if operands.len() != operator.arity() {
            return Err(CompileError::illegal(format!(
                "{} expects {} operand(s) but got {}",
                operator,
                operator.arity(),
                operands.len()
            )));
        }
        if operands.iter().any(|o| matches!(o, Operand::Criteria(_))) {
            return Err(CompileError::illegal(format!(
                "{} cannot compare against a nested criteria",
                operator
            )));
        }
        Ok(self.finish(operator, operands))
    }

    pub fn is(self, value: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Eq, value)
    }

    pub fn eq(self, value: impl Into<Value>) -> QueryCriteria {
        self.is(value)
    }

    pub fn ne(self, value: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Lt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Lte, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Gt, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Gte, value)
    }

    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> QueryCriteria {
        self.finish(
            Operator::Between,
            vec![Operand::Value(low.into()), Operand::Value(high.into())],
        )
    }

    pub fn like(self, pattern: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Like, pattern)
    }

    pub fn not_like(self, pattern: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::NotLike, pattern)
    }

    pub fn starting_with(self, prefix: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::StartsWith, prefix)
    }

    pub fn ending_with(self, suffix: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::EndsWith, suffix)
    }

    pub fn containing(self, needle: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Contains, needle)
    }

    pub fn not_containing(self, needle: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::NotContains, needle)
    }

    pub fn regex(self, pattern: impl Into<Value>) -> QueryCriteria {
        self.value(Operator::Regex, pattern)
    }

    /// Set membership. The whole collection is a single operand.
    pub fn in_<I, T>(self, values: I) -> QueryCriteria
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let array = Value::Array(values.into_iter().map(Into::into).collect());
        self.value(Operator::In, array)
    }

    pub fn not_in<I, T>(self, values: I) -> QueryCriteria
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let array = Value::Array(values.into_iter().map(Into::into).collect());
        self.value(Operator::NotIn, array)
    }

    pub fn is_null(self) -> QueryCriteria {
        self.finish(Operator::IsNull, Vec::new())
    }

    pub fn is_not_null(self) -> QueryCriteria {
        self.finish(Operator::IsNotNull, Vec::new())
    }

    pub fn is_missing(self) -> QueryCriteria {
        self.finish(Operator::IsMissing, Vec::new())
    }

    pub fn is_not_missing(self) -> QueryCriteria {
        self.finish(Operator::IsNotMissing, Vec::new())
    }

    pub fn is_valued(self) -> QueryCriteria {
        self.finish(Operator::IsValued, Vec::new())
    }

    pub fn is_not_valued(self) -> QueryCriteria {
        self.finish(Operator::IsNotValued, Vec::new())
    }

    pub fn is_true(self) -> QueryCriteria {
        self.finish(Operator::True, Vec::new())
    }

    pub fn is_false(self) -> QueryCriteria {
        self.finish(Operator::False, Vec::new())
    }
}

impl QueryCriteria {
    fn node(operator: Operator, operands: Vec<Operand>) -> Self {
        Self {
            field: None,
            operator,
            operands,
            negated: false,
            field_fold: None,
            value_fold: None,
            grouped: false,
        }
    }

    pub fn field(&self) -> Option<&FieldPath> {
        self.field.as_ref()
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Continue the chain with `and <key> ...`.
    pub fn and(self, key: &str) -> CriterionBuilder {
        self.and_field(FieldPath::from_key(key))
    }

    /// Continue the chain with `or <key> ...`.
    pub fn or(self, key: &str) -> CriterionBuilder {
        self.or_field(FieldPath::from_key(key))
    }

    /// Like [`and`](Self::and) for an already resolved field.
    pub fn and_field(self, field: FieldPath) -> CriterionBuilder {
        CriterionBuilder {
            chain: Some((Operator::And, self)),
            ..CriterionBuilder::new(field)
        }
    }

    pub fn or_field(self, field: FieldPath) -> CriterionBuilder {
        CriterionBuilder {
            chain: Some((Operator::Or, self)),
            ..CriterionBuilder::new(field)
        }
    }

    /// Append `other` with `and`, keeping it unparenthesized.
    pub fn and_with(self, other: QueryCriteria) -> QueryCriteria {
        Self::node(
            Operator::And,
            vec![
                Operand::Criteria(Box::new(self)),
                Operand::Criteria(Box::new(other)),
            ],
        )
    }

    /// Append `other` with `or`, keeping it unparenthesized.
    pub fn or_with(self, other: QueryCriteria) -> QueryCriteria {
        Self::node(
            Operator::Or,
            vec![
                Operand::Criteria(Box::new(self)),
                Operand::Criteria(Box::new(other)),
            ],
        )
    }

    /// `<self> and (<other>)`
    pub fn and_group(self, other: QueryCriteria) -> QueryCriteria {
        self.and_with(other.group())
    }

    /// `<self> or (<other>)`
    pub fn or_group(self, other: QueryCriteria) -> QueryCriteria {
        self.or_with(other.group())
    }

    /// Parenthesize this criteria when it is rendered as a chain operand.
    pub fn group(mut self) -> Self {
        self.grouped = true;
        self
    }

    /// Logical negation.
    pub fn negate(mut self) -> QueryCriteria {
        if self.negated {
            self.negated = false;
            self.grouped |= self.operator.is_chain();
            return self;
        }

        if self.operator == Operator::Not && self.operands.len() == 1 {
            if let Some(Operand::Criteria(child)) = self.operands.pop() {
                let mut child = *child;
                child.grouped |= child.operator.is_chain();
                return child;
            }
        }

        match self.operator.opposite() {
            Some(opposite) => self.operator = opposite,
            None => self.negated = true,
        }
        self
    }

    /// Number of operands still waiting for a runtime argument.
    pub fn deferred_count(&self) -> usize {
        self.operands
            .iter()
            .map(|operand| match operand {
                Operand::Deferred(_) => 1,
                Operand::Criteria(child) => child.deferred_count(),
                Operand::Value(_) => 0,
            })
            .sum()
    }

    /// Copy of this tree with every deferred operand replaced by the next
    /// argument, in rendering order.
    pub fn resolved(
        &self,
        arguments: &mut dyn Iterator<Item = Argument>,
    ) -> Result<QueryCriteria, CompileError> {
        let mut copy = self.clone();
        copy.resolve_in_place(arguments)?;
        Ok(copy)
    }

    fn resolve_in_place(
        &mut self,
        arguments: &mut dyn Iterator<Item = Argument>,
    ) -> Result<(), CompileError> {
        for operand in &mut self.operands {
            match operand {
                Operand::Deferred(conversion) => {
                    let argument = arguments.next().ok_or_else(|| {
                        CompileError::illegal("not enough arguments to bind every parameter")
                    })?;
                    *operand = Operand::Value(conversion.apply(argument)?);
                }
                Operand::Criteria(child) => child.resolve_in_place(arguments)?,
                Operand::Value(_) => {}
            }
        }
        Ok(())
    }

    /// Render with inline literals.
    pub fn export(&self) -> Result<String, CompileError> {
        Ok(self.render(&mut LiteralRenderer)?.into_string())
    }

    /// Render with placeholders, binding every value into `binder`.
    pub fn export_bound(&self, binder: &mut ParamBinder) -> Result<Expression, CompileError> {
        self.render(binder)
    }

    pub fn render(&self, renderer: &mut dyn ValueRenderer) -> Result<Expression, CompileError> {
        let expr = self.render_node(renderer)?;
        Ok(if self.negated {
            Expression::not(&expr)
        } else {
            expr
        })
    }

    fn render_operand(
        child: &QueryCriteria,
        renderer: &mut dyn ValueRenderer,
    ) -> Result<Expression, CompileError> {
        let expr = child.render(renderer)?;
        Ok(if child.grouped && !child.negated {
            Expression::paren(&expr)
        } else {
            expr
        })
    }

    fn render_node(&self, renderer: &mut dyn ValueRenderer) -> Result<Expression, CompileError> {
        if self.operator.takes_criteria() {
            return self.render_combinator(renderer);
        }

        let field = self.field.as_ref().ok_or_else(|| {
            CompileError::illegal(format!("{} criteria has no field", self.operator))
        })?;
        let hint = field.param_name();
        let mut left = Expression::x(field.as_str());
        if let Some(fold) = self.field_fold {
            left = fold.apply(&left);
        }

        let mut values = Vec::with_capacity(self.operands.len());
        for operand in &self.operands {
            match operand {
                Operand::Value(value) => {
                    let rendered = renderer.render(&hint, value.clone());
                    values.push(match self.value_fold {
                        Some(fold) => fold.apply(&rendered),
                        None => rendered,
                    });
                }
                Operand::Deferred(_) => return Err(CompileError::UnresolvedOperand),
                Operand::Criteria(_) => {
                    return Err(CompileError::illegal(format!(
                        "{} cannot compare against a nested criteria",
                        self.operator
                    )));
                }
            }
        }
        if values.len() != self.operator.arity() {
            return Err(CompileError::illegal(format!(
                "{} expects {} operand(s) but got {}",
                self.operator,
                self.operator.arity(),
                values.len()
            )));
        }

        let expr = match self.operator {
            Operator::Eq => left.eq(&values[0]),
            Operator::Ne => left.ne(&values[0]),
            Operator::Lt => left.lt(&values[0]),
            Operator::Lte => left.lte(&values[0]),
            Operator::Gt => left.gt(&values[0]),
            Operator::Gte => left.gte(&values[0]),
            Operator::Between => left.between(&values[0], &values[1]),
            Operator::Like => left.like(&values[0]),
            Operator::NotLike => left.not_like(&values[0]),
            Operator::StartsWith => {
                left.like(&Expression::paren(&values[0].concat(&Expression::s("%"))))
            }
            Operator::EndsWith => {
                left.like(&Expression::paren(&Expression::s("%").concat(&values[0])))
            }
            Operator::Contains => Expression::contains(&left, &values[0]),
            Operator::NotContains => Expression::not(&Expression::contains(&left, &values[0])),
            Operator::In => left.in_(&values[0]),
            Operator::NotIn => left.not_in(&values[0]),
            Operator::IsNull => left.is_null(),
            Operator::IsNotNull => left.is_not_null(),
            Operator::IsMissing => left.is_missing(),
            Operator::IsNotMissing => left.is_not_missing(),
            Operator::IsValued => left.is_valued(),
            Operator::IsNotValued => left.is_not_valued(),
            Operator::True => left.eq(&Expression::boolean(true)),
            Operator::False => left.eq(&Expression::boolean(false)),
            Operator::Regex => Expression::regexp_like(&left, &values[0]),
            Operator::And | Operator::Or | Operator::Not => {
                return self.render_combinator(renderer);
            }
        };
        Ok(expr)
    }

    fn render_combinator(
        &self,
        renderer: &mut dyn ValueRenderer,
    ) -> Result<Expression, CompileError> {
        let mut children = Vec::with_capacity(self.operands.len());
        for operand in &self.operands {
            match operand {
                Operand::Criteria(child) => children.push(child.as_ref()),
                _ => {
                    return Err(CompileError::illegal(format!(
                        "{} operands must be criteria",
                        self.operator
                    )));
                }
            }
        }

        match (self.operator, children.as_slice()) {
            (Operator::Not, [child]) => Ok(Expression::not(&child.render(renderer)?)),
            (Operator::And | Operator::Or, [first, rest @ ..]) if !rest.is_empty() => {
                let mut expr = Self::render_operand(first, renderer)?;
                for child in rest {
                    let right = Self::render_operand(child, renderer)?;
                    expr = if self.operator == Operator::And {
                        expr.and(&right)
                    } else {
                        expr.or(&right)
                    };
                }
                Ok(expr)
            }
            (operator, children) => Err(CompileError::illegal(format!(
                "{} cannot combine {} criteria",
                operator,
                children.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::params::PlaceholderStyle;
    use rstest::rstest;

    #[rstest]
    #[case(where_("name").is("Bubba"), r#"`name` = "Bubba""#)]
    #[case(where_("name").is(Value::Null), "`name` = null")]
    #[case(where_("name").is(5), "`name` = 5")]
    #[case(where_("name").ne("Bubba"), r#"`name` != "Bubba""#)]
    #[case(where_("age").lt(21), "`age` < 21")]
    #[case(where_("age").lte(21), "`age` <= 21")]
    #[case(where_("age").gt(21), "`age` > 21")]
    #[case(where_("age").gte(21), "`age` >= 21")]
    fn test_simple_comparisons(#[case] criteria: QueryCriteria, #[case] expected: &str) {
        assert_eq!(criteria.export().unwrap(), expected);
    }

    #[rstest]
    #[case(where_("age").between(18, 65), "`age` between 18 and 65")]
    #[case(where_("name").like("Bub%"), r#"`name` like "Bub%""#)]
    #[case(where_("name").not_like("Bub%"), r#"`name` not like "Bub%""#)]
    #[case(where_("name").starting_with("Bu"), r#"`name` like ("Bu"||"%")"#)]
    #[case(where_("name").ending_with("ba"), r#"`name` like ("%"||"ba")"#)]
    #[case(where_("name").containing("ub"), r#"contains(`name`, "ub")"#)]
    #[case(where_("name").not_containing("ub"), r#"not(contains(`name`, "ub"))"#)]
    #[case(where_("name").in_(["a", "b"]), r#"`name` in ["a", "b"]"#)]
    #[case(where_("name").not_in(["a"]), r#"`name` not in ["a"]"#)]
    #[case(where_("name").is_null(), "`name` is null")]
    #[case(where_("name").is_not_null(), "`name` is not null")]
    #[case(where_("name").is_missing(), "`name` is missing")]
    #[case(where_("name").is_not_missing(), "`name` is not missing")]
    #[case(where_("name").is_valued(), "`name` is valued")]
    #[case(where_("name").is_not_valued(), "`name` is not valued")]
    #[case(where_("active").is_true(), "`active` = true")]
    #[case(where_("active").is_false(), "`active` = false")]
    #[case(where_("name").regex("^B.*"), r#"regexp_like(`name`, "^B.*")"#)]
    fn test_operator_templates(#[case] criteria: QueryCriteria, #[case] expected: &str) {
        assert_eq!(criteria.export().unwrap(), expected);
    }

    #[test]
    fn test_chain_is_left_to_right() {
        let criteria = where_("name")
            .is("Bubba")
            .and("age")
            .lt(21)
            .or("country")
            .is("Austria");
        assert_eq!(
            criteria.export().unwrap(),
            r#"`name` = "Bubba" and `age` < 21 or `country` = "Austria""#
        );
        assert_eq!(criteria.operator(), Operator::Or);
    }

    #[test]
    fn test_nested_group() {
        let criteria = where_("name")
            .is("Bubba")
            .and_group(where_("age").gt(12).or("country").is("Austria"));
        assert_eq!(
            criteria.export().unwrap(),
            r#"`name` = "Bubba" and (`age` > 12 or `country` = "Austria")"#
        );
    }

    #[test]
    fn test_case_folds() {
        assert_eq!(
            where_("name").upper().is("BUBBA").export().unwrap(),
            r#"upper(`name`) = "BUBBA""#
        );
        assert_eq!(
            where_("name").ignore_case().is("Bubba").export().unwrap(),
            r#"lower(`name`) = lower("Bubba")"#
        );
    }

    #[test]
    fn test_verbatim_keys() {
        assert_eq!(
            where_("meta().id").is("doc::1").export().unwrap(),
            r#"meta().id = "doc::1""#
        );
        assert_eq!(
            where_("address.city").is("Vienna").export().unwrap(),
            r#"`address`.`city` = "Vienna""#
        );
    }

    #[rstest]
    #[case(where_("name").is("a"), r#"`name` != "a""#)]
    #[case(where_("age").lt(3), "`age` >= 3")]
    #[case(where_("age").gt(3), "`age` <= 3")]
    #[case(where_("name").in_(["a"]), r#"`name` not in ["a"]"#)]
    #[case(where_("name").is_null(), "`name` is not null")]
    #[case(where_("name").containing("a"), r#"not(contains(`name`, "a"))"#)]
    #[case(where_("active").is_true(), "`active` = false")]
    #[case(where_("age").between(1, 2), "not(`age` between 1 and 2)")]
    #[case(where_("name").starting_with("a"), r#"not(`name` like ("a"||"%"))"#)]
    fn test_negate_leaf(#[case] criteria: QueryCriteria, #[case] expected: &str) {
        assert_eq!(criteria.negate().export().unwrap(), expected);
    }

    #[rstest]
    #[case(where_("name").ignore_case().in_(["a", "b"]), r#"lower(`name`) in ["a", "b"]"#)]
    #[case(where_("name").ignore_case().not_in(["a"]), r#"lower(`name`) not in ["a"]"#)]
    #[case(where_("name").ignore_case().regex("^a"), r#"regexp_like(lower(`name`), "^a")"#)]
    #[case(where_("name").ignore_case().is("A"), r#"lower(`name`) = lower("A")"#)]
    fn test_ignore_case_leaves_arrays_and_patterns_unfolded(
        #[case] criteria: QueryCriteria,
        #[case] expected: &str,
    ) {
        assert_eq!(criteria.export().unwrap(), expected);
    }

    #[test]
    fn test_negate_compound_wraps_without_de_morgan() {
        let criteria = where_("a").is(1).and("b").is(2).negate();
        assert_eq!(criteria.export().unwrap(), "not(`a` = 1 and `b` = 2)");
    }

    #[test]
    fn test_negate_twice_restores() {
        let chain = where_("a").is(1).or("b").is(2);
        let twice = chain.clone().negate().negate();
        assert_eq!(twice.export().unwrap(), chain.export().unwrap());
        assert!(!twice.is_negated());
        assert!(twice.is_grouped());
    }

    #[test]
    fn test_negate_twice_inside_chain_keeps_parentheses() {
        let or_chain = where_("a").is(1).or("b").is(2);
        let criteria = where_("x").is(0).and_with(or_chain.negate().negate());
        assert_eq!(criteria.export().unwrap(), "`x` = 0 and (`a` = 1 or `b` = 2)");
    }

    #[test]
    fn test_negate_not_unwraps() {
        let inner = where_("a").is(1).and("b").is(2);
        let negated = not(inner).negate();
        assert_eq!(negated.operator(), Operator::And);
        assert!(negated.is_grouped());
        assert_eq!(
            where_("c").is(3).or_with(negated).export().unwrap(),
            "`c` = 3 or (`a` = 1 and `b` = 2)"
        );
    }

    #[test]
    fn test_negated_group_in_chain() {
        let criteria = where_("x").is(1).and_group(where_("a").is(1).or("b").is(2).negate());
        assert_eq!(
            criteria.export().unwrap(),
            "`x` = 1 and not(`a` = 1 or `b` = 2)"
        );
    }

    #[test]
    fn test_export_bound_positional() {
        let criteria = where_("name").is("Bubba").and("age").between(18, 65);
        let mut binder = ParamBinder::new(PlaceholderStyle::Positional);
        let expr = criteria.export_bound(&mut binder).unwrap();
        assert_eq!(expr.as_str(), "`name` = $1 and `age` between $2 and $3");
        let values = binder.finish().unwrap();
        assert_eq!(
            values.positional().unwrap(),
            &[Value::from("Bubba"), Value::Int(18), Value::Int(65)]
        );
    }

    #[test]
    fn test_export_bound_in_uses_one_placeholder() {
        let criteria = where_("name").in_(["a", "b", "c"]);
        let mut binder = ParamBinder::new(PlaceholderStyle::Positional);
        let expr = criteria.export_bound(&mut binder).unwrap();
        assert_eq!(expr.as_str(), "`name` in $1");
        assert_eq!(binder.finish().unwrap().len(), 1);
    }

    #[test]
    fn test_export_bound_named() {
        let criteria = where_("address.city").is("Vienna").and("age").between(18, 65);
        let mut binder = ParamBinder::new(PlaceholderStyle::Named);
        let expr = criteria.export_bound(&mut binder).unwrap();
        assert_eq!(
            expr.as_str(),
            "`address`.`city` = $address_city and `age` between $age and $age_2"
        );
    }

    #[test]
    fn test_deferred_operands_resolve_in_order() {
        let criteria = CriterionBuilder::new(FieldPath::from_key("age"))
            .compare(
                Operator::Between,
                vec![
                    Operand::Deferred(Conversion::Scalar),
                    Operand::Deferred(Conversion::Scalar),
                ],
            )
            .unwrap()
            .and_with(
                CriterionBuilder::new(FieldPath::from_key("status"))
                    .compare(Operator::In, vec![Operand::Deferred(Conversion::Array)])
                    .unwrap(),
            );
        assert_eq!(criteria.deferred_count(), 3);

        let args = vec![
            Argument::from(18),
            Argument::from(65),
            Argument::collection([Argument::enum_variant("ACTIVE"), Argument::from("NEW")]),
        ];
        let resolved = criteria.resolved(&mut args.into_iter()).unwrap();
        assert_eq!(resolved.deferred_count(), 0);
        assert_eq!(
            resolved.export().unwrap(),
            r#"`age` between 18 and 65 and `status` in ["ACTIVE", "NEW"]"#
        );
    }

    #[test]
    fn test_unresolved_export_fails() {
        let criteria = CriterionBuilder::new(FieldPath::from_key("age"))
            .compare(Operator::Eq, vec![Operand::Deferred(Conversion::Scalar)])
            .unwrap();
        assert_eq!(criteria.export(), Err(CompileError::UnresolvedOperand));
    }

    #[test]
    fn test_too_few_arguments() {
        let criteria = CriterionBuilder::new(FieldPath::from_key("age"))
            .compare(Operator::Eq, vec![Operand::Deferred(Conversion::Scalar)])
            .unwrap();
        let err = criteria.resolved(&mut std::iter::empty()).unwrap_err();
        assert!(matches!(err, CompileError::IllegalArgument { .. }));
    }

    #[rstest]
    #[case(Operator::Between, 1)]
    #[case(Operator::Eq, 0)]
    #[case(Operator::IsNull, 1)]
    fn test_compare_checks_arity(#[case] operator: Operator, #[case] count: usize) {
        let operands = vec![Operand::Value(Value::Int(1)); count];
        let result = CriterionBuilder::new(FieldPath::from_key("f")).compare(operator, operands);
        assert!(matches!(result, Err(CompileError::IllegalArgument { .. })));
    }

    #[test]
    fn test_compare_rejects_combinator() {
        let result = CriterionBuilder::new(FieldPath::from_key("f")).compare(Operator::And, vec![]);
        assert!(result.is_err());
    }
}
