use std::fmt;

/// Closed set of criteria operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
    Like,
    NotLike,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    IsMissing,
    IsNotMissing,
    IsValued,
    IsNotValued,
    True,
    False,
    Regex,
    And,
    Or,
    Not,
}

impl Operator {
    /// Number of operands the operator takes.
    ///
    /// Combinators count child criteria, every other operator counts values.
    pub fn arity(self) -> usize {
        use Operator::*;
        match self {
            IsNull | IsNotNull | IsMissing | IsNotMissing | IsValued | IsNotValued | True
            | False => 0,
            Eq | Ne | Lt | Lte | Gt | Gte | Like | NotLike | StartsWith | EndsWith | Contains
            | NotContains | In | NotIn | Regex | Not => 1,
            Between | And | Or => 2,
        }
    }

    /// `AND` and `OR`: operands are child criteria.
    pub fn is_chain(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    /// Operators whose operands are child criteria rather than values.
    pub fn takes_criteria(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }

    /// Semantic opposite of a leaf operator, if it has one.
    pub fn opposite(self) -> Option<Operator> {
        use Operator::*;
        let opposite = match self {
            Eq => Ne,
            Ne => Eq,
            Lt => Gte,
            Gte => Lt,
            Lte => Gt,
            Gt => Lte,
            Like => NotLike,
            NotLike => Like,
            Contains => NotContains,
            NotContains => Contains,
            In => NotIn,
            NotIn => In,
            IsNull => IsNotNull,
            IsNotNull => IsNull,
            IsMissing => IsNotMissing,
            IsNotMissing => IsMissing,
            IsValued => IsNotValued,
            IsNotValued => IsValued,
            True => False,
            False => True,
            Between | StartsWith | EndsWith | Regex | And | Or | Not => return None,
        };
        Some(opposite)
    }

    pub fn name(self) -> &'static str {
        use Operator::*;
        match self {
            Eq => "EQ",
            Ne => "NE",
            Lt => "LT",
            Lte => "LTE",
            Gt => "GT",
            Gte => "GTE",
            Between => "BETWEEN",
            Like => "LIKE",
            NotLike => "NOT_LIKE",
            StartsWith => "STARTS_WITH",
            EndsWith => "ENDS_WITH",
            Contains => "CONTAINS",
            NotContains => "NOT_CONTAINS",
            In => "IN",
            NotIn => "NOT_IN",
            IsNull => "IS_NULL",
            IsNotNull => "IS_NOT_NULL",
            IsMissing => "IS_MISSING",
            IsNotMissing => "IS_NOT_MISSING",
            IsValued => "IS_VALUED",
            IsNotValued => "IS_NOT_VALUED",
            True => "TRUE",
            False => "FALSE",
            Regex => "REGEX",
            And => "AND",
            Or => "OR",
            Not => "NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
