//! Expression engine: comparison, boolean and membership fragments.
//!
//! Every operator takes a column (or a previously built [`Expr`]) on the left
//! and a column, expression or literal on the right, and returns a **new**
//! [`Expr`] carrying its pre-rendered, fully parenthesized SQL text. Operands
//! are never mutated.
//!
//! Literals are inlined, not bound: strings are single-quoted *without*
//! escaping embedded quotes, numbers use their plain decimal form.
//!
//! ```
//! use chainql::{Column, ColumnType, Operators};
//!
//! let id = Column::new("items", "id", ColumnType::Integer);
//! let cond = id.greater_than(10).unwrap().and(id.less_than(20).unwrap());
//! assert_eq!(cond.sql(), "((items.id > 10) and (items.id < 20))");
//! ```

use crate::catalog::Column;
use crate::error::{ChainError, ChainResult};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Semantic kind of an operand, used only for comparison validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Text,
    Real,
    Unknown,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Integer => "integer",
            Kind::Text => "text",
            Kind::Real => "real",
            Kind::Unknown => "unknown",
        })
    }
}

/// A literal value inlined into statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Integer(_) => Kind::Integer,
            Value::Real(_) => Kind::Real,
            Value::Text(_) => Kind::Text,
        }
    }

    /// Literal SQL form. Embedded quotes in text are not escaped.
    ///
    /// Reals use Rust's shortest round-trip form: whole numbers keep a
    /// trailing `.0` and very large or small magnitudes use exponent notation
    /// without padding (`1e20`, `1e-7`).
    pub fn render(&self) -> String {
        match self {
            Value::Integer(v) => v.to_string(),
            Value::Real(v) => format!("{:?}", v),
            Value::Text(s) => format!("'{}'", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

/// Widened through the `f32`'s own shortest decimal form, so `0.1f32`
/// stays `0.1` instead of `0.10000000149011612`.
impl From<f32> for Value {
    fn from(v: f32) -> Self {
        let widened = format!("{:?}", v).parse::<f64>().unwrap_or(f64::from(v));
        Value::Real(widened)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

/// Right-hand (or list item) operand of an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(Column),
    Expr(Expr),
    Value(Value),
}

impl Operand {
    pub fn kind(&self) -> Kind {
        match self {
            Operand::Column(c) => c.kind(),
            Operand::Expr(e) => e.origin.kind(),
            Operand::Value(v) => v.kind(),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Operand::Column(c) => c.qualified(),
            Operand::Expr(e) => e.sql.clone(),
            Operand::Value(v) => v.render(),
        }
    }
}

impl From<&Column> for Operand {
    fn from(c: &Column) -> Self {
        Operand::Column(c.clone())
    }
}

impl From<Column> for Operand {
    fn from(c: Column) -> Self {
        Operand::Column(c)
    }
}

impl From<&Expr> for Operand {
    fn from(e: &Expr) -> Self {
        Operand::Expr(e.clone())
    }
}

impl From<Expr> for Operand {
    fn from(e: Expr) -> Self {
        Operand::Expr(e)
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

macro_rules! operand_from_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

operand_from_literal!(i64, i32, u32, f64, f32, &str, String, &String);

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        }
    }
}

/// Boolean combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

/// Shape of a derived expression; operand texts are already rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Comparison {
        op: CompareOp,
        left: String,
        right: String,
    },
    Boolean {
        op: BoolOp,
        left: String,
        right: String,
    },
    Membership {
        negated: bool,
        left: String,
        items: Vec<String>,
    },
    /// Membership against a single operand, rendered without list parentheses.
    MemberOf {
        negated: bool,
        left: String,
        right: String,
    },
}

impl ExprNode {
    fn render(&self) -> String {
        match self {
            ExprNode::Comparison { op, left, right } => {
                format!("({} {} {})", left, op.as_str(), right)
            }
            ExprNode::Boolean { op, left, right } => {
                format!("({} {} {})", left, op.as_str(), right)
            }
            ExprNode::Membership {
                negated,
                left,
                items,
            } => {
                let op = if *negated { "not in" } else { "in" };
                format!("({} {} ({}))", left, op, items.join(", "))
            }
            ExprNode::MemberOf {
                negated,
                left,
                right,
            } => {
                let op = if *negated { "not in" } else { "in" };
                format!("({} {} {})", left, op, right)
            }
        }
    }
}

/// A derived column descriptor: the result of an operator call.
///
/// It remembers the column its left-most operand came from (name, owning
/// table, declared type), so it can itself take part in further comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    origin: Column,
    node: ExprNode,
    sql: String,
}

impl Expr {
    fn new(origin: Column, node: ExprNode) -> Self {
        let sql = node.render();
        Self { origin, node, sql }
    }

    /// The rendered, parenthesized fragment.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }

    pub fn node(&self) -> &ExprNode {
        &self.node
    }

    /// Column the left-most operand was derived from.
    pub fn origin(&self) -> &Column {
        &self.origin
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Right-hand side of a membership operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Members {
    /// A collection, rendered as a parenthesized list.
    List(Vec<Operand>),
    /// A single column, expression or literal, rendered as-is.
    Single(Operand),
}

/// Arguments accepted by membership operators.
///
/// Collections become a list. Ordered collections keep their iteration
/// order; unordered ones (`HashSet`) are sorted first so the rendered list is
/// deterministic. A single column, expression or literal is rendered as the
/// right operand directly: `(items.id in info.id)`.
pub trait IntoMembers {
    fn into_members(self) -> Members;
}

impl<T: Into<Operand>> IntoMembers for Vec<T> {
    fn into_members(self) -> Members {
        Members::List(self.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand>, const N: usize> IntoMembers for [T; N] {
    fn into_members(self) -> Members {
        Members::List(self.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand> + Clone> IntoMembers for &[T] {
    fn into_members(self) -> Members {
        Members::List(self.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Operand>> IntoMembers for BTreeSet<T> {
    fn into_members(self) -> Members {
        Members::List(self.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand> + Ord> IntoMembers for HashSet<T> {
    fn into_members(self) -> Members {
        let mut items: Vec<T> = self.into_iter().collect();
        items.sort();
        Members::List(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! single_member {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoMembers for $ty {
                fn into_members(self) -> Members {
                    Members::Single(self.into())
                }
            }
        )*
    };
}

single_member!(
    Operand, &Column, Column, &Expr, Expr, Value, i64, i32, u32, f64, f32, &str, String, &String,
);

fn check_kinds(left: Kind, right: Kind) -> ChainResult<()> {
    if left == right {
        Ok(())
    } else {
        Err(ChainError::TypeMismatch { left, right })
    }
}

/// Operators shared by base columns and derived expressions.
pub trait Operators {
    /// This value as a left operand.
    fn operand(&self) -> Operand;

    /// Column descriptor the result of an operator is attributed to.
    fn origin(&self) -> &Column;

    #[doc(hidden)]
    fn compare(&self, op: CompareOp, other: Operand) -> ChainResult<Expr> {
        let left = self.operand();
        check_kinds(left.kind(), other.kind())?;
        Ok(Expr::new(
            self.origin().clone(),
            ExprNode::Comparison {
                op,
                left: left.render(),
                right: other.render(),
            },
        ))
    }

    #[doc(hidden)]
    fn combine(&self, op: BoolOp, other: Operand) -> Expr {
        Expr::new(
            self.origin().clone(),
            ExprNode::Boolean {
                op,
                left: self.operand().render(),
                right: other.render(),
            },
        )
    }

    #[doc(hidden)]
    fn membership(&self, negated: bool, members: Members) -> Expr {
        let left = self.operand().render();
        let node = match members {
            Members::Single(right) => ExprNode::MemberOf {
                negated,
                left,
                right: right.render(),
            },
            Members::List(items) => ExprNode::Membership {
                negated,
                left,
                items: items
                    .into_iter()
                    .filter(|item| {
                        let keep = !matches!(item, Operand::Value(Value::Real(_)));
                        if !keep {
                            tracing::trace!(
                                target: "chainql.builder",
                                item = %item.render(),
                                "dropped real literal from membership list"
                            );
                        }
                        keep
                    })
                    .map(|item| item.render())
                    .collect(),
            },
        };
        Expr::new(self.origin().clone(), node)
    }

    /// `(<left> = <right>)`; fails on a kind mismatch.
    fn equals(&self, other: impl Into<Operand>) -> ChainResult<Expr> {
        self.compare(CompareOp::Eq, other.into())
    }

    /// `(<left> != <right>)`; fails on a kind mismatch.
    fn not_equals(&self, other: impl Into<Operand>) -> ChainResult<Expr> {
        self.compare(CompareOp::Ne, other.into())
    }

    /// `(<left> < <right>)`; fails on a kind mismatch.
    fn less_than(&self, other: impl Into<Operand>) -> ChainResult<Expr> {
        self.compare(CompareOp::Lt, other.into())
    }

    /// `(<left> > <right>)`; fails on a kind mismatch.
    fn greater_than(&self, other: impl Into<Operand>) -> ChainResult<Expr> {
        self.compare(CompareOp::Gt, other.into())
    }

    /// `(<left> and <right>)`, no kind check.
    fn and(&self, other: impl Into<Operand>) -> Expr {
        self.combine(BoolOp::And, other.into())
    }

    /// `(<left> or <right>)`, no kind check.
    fn or(&self, other: impl Into<Operand>) -> Expr {
        self.combine(BoolOp::Or, other.into())
    }

    /// `(<left> in (<items>))` for a collection, `(<left> in <right>)` for a
    /// single operand. Real literals are dropped from lists.
    fn is_in(&self, items: impl IntoMembers) -> Expr {
        self.membership(false, items.into_members())
    }

    /// `(<left> not in (<items>))` for a collection, `(<left> not in <right>)`
    /// for a single operand. Real literals are dropped from lists.
    fn not_in(&self, items: impl IntoMembers) -> Expr {
        self.membership(true, items.into_members())
    }
}

impl Operators for Column {
    fn operand(&self) -> Operand {
        Operand::Column(self.clone())
    }

    fn origin(&self) -> &Column {
        self
    }
}

impl Operators for Expr {
    fn operand(&self) -> Operand {
        Operand::Expr(self.clone())
    }

    fn origin(&self) -> &Column {
        &self.origin
    }
}
