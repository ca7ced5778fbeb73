use crate::{
    error::InternalError,
    value::{TypeRef, Value, ValueEnum},
};

///
/// EvaluatorKind
///
/// Comparator carried by a field evaluator. Only the first six kinds can
/// ever be pushed into a native statement; `NotEquals` and `NotIn` are
/// always evaluated client side.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EvaluatorKind {
    Equals,
    GreaterThan,
    GreaterThanOrEqual,
    SmallerThan,
    SmallerThanOrEqual,
    In,
    NotEquals,
    NotIn,
}

impl EvaluatorKind {
    #[must_use]
    pub const fn is_pushable(self) -> bool {
        !matches!(self, Self::NotEquals | Self::NotIn)
    }

    /// Native comparison operator for single-placeholder kinds.
    #[must_use]
    pub const fn operator(self) -> Option<&'static str> {
        match self {
            Self::Equals => Some("="),
            Self::GreaterThan => Some(">"),
            Self::GreaterThanOrEqual => Some(">="),
            Self::SmallerThan => Some("<"),
            Self::SmallerThanOrEqual => Some("<="),
            Self::In | Self::NotEquals | Self::NotIn => None,
        }
    }
}

///
/// Operand
///
/// Right-hand side of a field evaluator: a literal, or a reference to a
/// call-time parameter resolved when the operation executes.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(Value),
    Parameter(usize),
}

impl Operand {
    pub fn resolve(&self, params: &[Value]) -> Result<Value, InternalError> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Parameter(index) => params.get(*index).cloned().ok_or_else(|| {
                InternalError::planner_config(format!(
                    "query parameter {index} is not bound ({} supplied)",
                    params.len()
                ))
            }),
        }
    }
}

macro_rules! operand_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Self::Value(value.into())
                }
            }
        )*
    };
}

operand_from!(Value, bool, i32, i64, f64, &str, String, ValueEnum, TypeRef);

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Self::Value(values.into())
    }
}

///
/// FieldEvaluator
///

#[derive(Clone, Debug, PartialEq)]
pub struct FieldEvaluator {
    pub field: String,
    pub kind: EvaluatorKind,
    pub operand: Operand,
}

impl FieldEvaluator {
    #[must_use]
    pub fn new(field: impl Into<String>, kind: EvaluatorKind, operand: impl Into<Operand>) -> Self {
        Self {
            field: field.into(),
            kind,
            operand: operand.into(),
        }
    }

    /// The literal operand, if parameters have been bound.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match &self.operand {
            Operand::Value(value) => Some(value),
            Operand::Parameter(_) => None,
        }
    }
}

///
/// Evaluator
///
/// Predicate tree node. `And` is the conjunctive evaluator collection;
/// `Or` subtrees are never pushed down.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Evaluator {
    Field(FieldEvaluator),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl Evaluator {
    #[must_use]
    pub fn equals(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::Equals, operand)
    }

    #[must_use]
    pub fn not_equals(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::NotEquals, operand)
    }

    #[must_use]
    pub fn greater_than(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::GreaterThan, operand)
    }

    #[must_use]
    pub fn greater_than_or_equal(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::GreaterThanOrEqual, operand)
    }

    #[must_use]
    pub fn smaller_than(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::SmallerThan, operand)
    }

    #[must_use]
    pub fn smaller_than_or_equal(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::SmallerThanOrEqual, operand)
    }

    /// Membership: IN-list on scalar columns, CONTAINS on collections.
    #[must_use]
    pub fn in_(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::In, operand)
    }

    #[must_use]
    pub fn not_in(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::field(field, EvaluatorKind::NotIn, operand)
    }

    #[must_use]
    pub fn field(
        field: impl Into<String>,
        kind: EvaluatorKind,
        operand: impl Into<Operand>,
    ) -> Self {
        Self::Field(FieldEvaluator::new(field, kind, operand))
    }

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    /// Number of field evaluators in this subtree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Field(_) => 1,
            Self::And(children) | Self::Or(children) => {
                children.iter().map(Self::leaf_count).sum()
            }
        }
    }

    // Replace parameter operands with their call-time values.
    pub(crate) fn bind(&self, params: &[Value]) -> Result<Self, InternalError> {
        match self {
            Self::Field(field) => Ok(Self::Field(FieldEvaluator {
                field: field.field.clone(),
                kind: field.kind,
                operand: Operand::Value(field.operand.resolve(params)?),
            })),
            Self::And(children) => Ok(Self::And(bind_all(children, params)?)),
            Self::Or(children) => Ok(Self::Or(bind_all(children, params)?)),
        }
    }
}

fn bind_all(children: &[Evaluator], params: &[Value]) -> Result<Vec<Evaluator>, InternalError> {
    children.iter().map(|child| child.bind(params)).collect()
}
