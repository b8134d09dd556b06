//! Declarative predicates and their translation into [`QueryGroup`] trees.
//!
//! [`Predicate`] is a small, language-neutral expression form: comparisons
//! between a member (column) and a constant, boolean members, AND/OR/NOT and
//! a few well-known function calls. Build it with [`col`] and the `&`, `|`,
//! `!` operators:
//!
//! ```ignore
//! use stmtforge::predicate::col;
//!
//! let p = col("Age").gt(18) & (col("City").eq("Oslo") | col("Name").starts_with("J"));
//! let group = QueryGroup::from_predicate(&p)?;
//! // ([Age] > @Age AND ([City] = @City OR [Name] LIKE @Name))
//! ```
//!
//! Anything the translator does not recognize is rejected with an
//! invalid-operation error.

use crate::error::{StmtError, StmtResult};
use crate::query_field::{Operation, QueryField};
use crate::query_group::{Conjunction, QueryGroup, QueryItem};
use crate::value::Value;
use std::ops::{BitAnd, BitOr, Not};

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A column reference.
    Member(String),
    /// A bound value.
    Constant(Value),
}

/// Comparison operator of a [`Predicate::Compare`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    /// The operator seen from the other side (`a < b` is `b > a`).
    pub fn flip(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Ge => CompareOp::Le,
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            CompareOp::Eq => Operation::Equal,
            CompareOp::Ne => Operation::NotEqual,
            CompareOp::Lt => Operation::LessThan,
            CompareOp::Gt => Operation::GreaterThan,
            CompareOp::Le => Operation::LessThanOrEqual,
            CompareOp::Ge => Operation::GreaterThanOrEqual,
        }
    }
}

/// A declarative predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    /// A boolean column used on its own, meaning `= true`.
    Member(String),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    /// `target.function(args...)`
    Call {
        function: String,
        target: Operand,
        args: Vec<Operand>,
    },
}

/// Start a predicate on a column.
pub fn col(name: impl Into<String>) -> Column {
    Column { name: name.into() }
}

/// Builder returned by [`col`].
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
}

impl Column {
    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Predicate {
        Predicate::Compare {
            left: Operand::Member(self.name),
            op,
            right: Operand::Constant(value.into()),
        }
    }

    fn call(self, function: &str, arg: Value) -> Predicate {
        Predicate::Call {
            function: function.to_string(),
            target: Operand::Member(self.name),
            args: vec![Operand::Constant(arg)],
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Le, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ge, value)
    }

    pub fn is_null(self) -> Predicate {
        self.compare(CompareOp::Eq, Value::Null)
    }

    pub fn is_not_null(self) -> Predicate {
        self.compare(CompareOp::Ne, Value::Null)
    }

    pub fn is_true(self) -> Predicate {
        Predicate::Member(self.name)
    }

    pub fn like(self, pattern: impl Into<String>) -> Predicate {
        self.call("like", Value::Text(pattern.into()))
    }

    pub fn contains(self, text: impl Into<String>) -> Predicate {
        self.call("contains", Value::Text(text.into()))
    }

    pub fn starts_with(self, text: impl Into<String>) -> Predicate {
        self.call("starts_with", Value::Text(text.into()))
    }

    pub fn ends_with(self, text: impl Into<String>) -> Predicate {
        self.call("ends_with", Value::Text(text.into()))
    }

    pub fn in_list<T: Into<Value>>(self, values: Vec<T>) -> Predicate {
        self.call("in", Value::from(values))
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

impl QueryGroup {
    /// Translate a predicate into a group.
    ///
    /// Nested operands with the same conjunction are flattened into one
    /// group; negation marks the translated group as negated.
    pub fn from_predicate(predicate: &Predicate) -> StmtResult<QueryGroup> {
        match predicate {
            Predicate::And(left, right) => combine(Conjunction::And, left, right),
            Predicate::Or(left, right) => combine(Conjunction::Or, left, right),
            Predicate::Not(inner) => Ok(QueryGroup::from_predicate(inner)?.negate()),
            leaf => Ok(QueryGroup::from(to_field(leaf)?)),
        }
    }
}

fn combine(conjunction: Conjunction, left: &Predicate, right: &Predicate) -> StmtResult<QueryGroup> {
    let mut items = Vec::new();
    push_operand(conjunction, left, &mut items)?;
    push_operand(conjunction, right, &mut items)?;
    Ok(QueryGroup::from_items(conjunction, items))
}

fn push_operand(conjunction: Conjunction, predicate: &Predicate, items: &mut Vec<QueryItem>) -> StmtResult<()> {
    match (conjunction, predicate) {
        (Conjunction::And, Predicate::And(..)) | (Conjunction::Or, Predicate::Or(..)) => {
            items.extend(QueryGroup::from_predicate(predicate)?.into_items());
        }
        (_, Predicate::And(..) | Predicate::Or(..) | Predicate::Not(_)) => {
            items.push(QueryItem::Group(QueryGroup::from_predicate(predicate)?));
        }
        (_, leaf) => items.push(QueryItem::Field(to_field(leaf)?)),
    }
    Ok(())
}

fn to_field(predicate: &Predicate) -> StmtResult<QueryField> {
    match predicate {
        Predicate::Compare { left, op, right } => match (left, right) {
            (Operand::Member(name), Operand::Constant(value)) => {
                QueryField::new(name.as_str(), op.operation(), value.clone())
            }
            (Operand::Constant(value), Operand::Member(name)) => {
                QueryField::new(name.as_str(), op.flip().operation(), value.clone())
            }
            (Operand::Member(a), Operand::Member(b)) => Err(StmtError::invalid_operation(format!(
                "comparing column '{a}' with column '{b}' is not supported"
            ))),
            (Operand::Constant(_), Operand::Constant(_)) => Err(StmtError::invalid_operation(
                "a comparison needs a column on one side",
            )),
        },
        Predicate::Member(name) => QueryField::eq(name.as_str(), true),
        Predicate::Call {
            function,
            target,
            args,
        } => call_to_field(function, target, args),
        Predicate::And(..) | Predicate::Or(..) | Predicate::Not(_) => Err(StmtError::invalid_operation(
            "a boolean group cannot be used as a single comparison",
        )),
    }
}

fn call_to_field(function: &str, target: &Operand, args: &[Operand]) -> StmtResult<QueryField> {
    let name = function.to_ascii_lowercase();
    match (name.as_str(), target, args) {
        ("contains", Operand::Member(column), [Operand::Constant(Value::Text(text))]) => {
            QueryField::like(column.as_str(), format!("%{text}%"))
        }
        ("startswith" | "starts_with", Operand::Member(column), [Operand::Constant(Value::Text(text))]) => {
            QueryField::like(column.as_str(), format!("{text}%"))
        }
        ("endswith" | "ends_with", Operand::Member(column), [Operand::Constant(Value::Text(text))]) => {
            QueryField::like(column.as_str(), format!("%{text}"))
        }
        ("like", Operand::Member(column), [Operand::Constant(pattern)]) => {
            QueryField::like(column.as_str(), pattern.clone())
        }
        ("in", Operand::Member(column), [Operand::Constant(list @ Value::List(_))])
        | ("contains", Operand::Constant(list @ Value::List(_)), [Operand::Member(column)]) => {
            QueryField::new(column.as_str(), Operation::In, list.clone())
        }
        _ => Err(StmtError::invalid_operation(format!(
            "function '{function}' is not supported in a predicate"
        ))),
    }
}
