//! Clause inputs: field lists, join kinds, order directions, limit bounds
//! and conditions, plus the token guard applied to free-form strings.

use crate::catalog::{Column, Table};
use crate::expr::Expr;
use std::fmt;

/// One argument of a field-list clause (select, from, group by, order by,
/// and the single-table targets of insert/update/delete).
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A whole table.
    Table(String),
    /// A base column.
    Column(Column),
    /// Free-form text, split on commas and guarded.
    Raw(String),
}

impl From<&Table> for Field {
    fn from(t: &Table) -> Self {
        Field::Table(t.name().to_string())
    }
}

impl From<&Column> for Field {
    fn from(c: &Column) -> Self {
        Field::Column(c.clone())
    }
}

impl From<Column> for Field {
    fn from(c: Column) -> Self {
        Field::Column(c)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Raw(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::Raw(s)
    }
}

impl From<&String> for Field {
    fn from(s: &String) -> Self {
        Field::Raw(s.clone())
    }
}

/// A variadic field list.
///
/// Implemented for single arguments, for homogeneous collections and for
/// tuples of mixed arguments, so `(&items, &info["id"], "name")` works.
pub trait IntoFields {
    fn into_fields(self) -> Vec<Field>;
}

impl IntoFields for () {
    fn into_fields(self) -> Vec<Field> {
        Vec::new()
    }
}

impl IntoFields for Field {
    fn into_fields(self) -> Vec<Field> {
        vec![self]
    }
}

macro_rules! single_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoFields for $ty {
                fn into_fields(self) -> Vec<Field> {
                    vec![Field::from(self)]
                }
            }
        )*
    };
}

single_field!(&Table, &Column, Column, &str, String, &String);

impl<T: Into<Field>> IntoFields for Vec<T> {
    fn into_fields(self) -> Vec<Field> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Field>, const N: usize> IntoFields for [T; N] {
    fn into_fields(self) -> Vec<Field> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! tuple_fields {
    ($($name:ident),+) => {
        impl<$($name: Into<Field>),+> IntoFields for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_fields(self) -> Vec<Field> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

tuple_fields!(A);
tuple_fields!(A, B);
tuple_fields!(A, B, C);
tuple_fields!(A, B, C, D);
tuple_fields!(A, B, C, D, E);
tuple_fields!(A, B, C, D, E, F);

/// Accept a trimmed token only if it is non-empty and has no space and no
/// semicolon. Not a sanitizer: anything else passes through verbatim.
pub(crate) fn is_safe_token(token: &str) -> bool {
    !token.is_empty() && !token.contains(' ') && !token.contains(';')
}

/// Comma-split `raw`, trim each part and keep the guarded ones.
pub(crate) fn split_tokens(raw: &str, clause: &'static str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| {
            let keep = is_safe_token(token);
            if !keep && !token.is_empty() {
                tracing::trace!(target: "chainql.builder", clause, token, "dropped token");
            }
            keep
        })
        .map(str::to_string)
        .collect()
}

fn dropped(clause: &'static str, field: &Field) {
    tracing::trace!(target: "chainql.builder", clause, field = ?field, "dropped field");
}

/// Resolve a select list: tables expand to `t.*`, columns to `t.c`.
pub(crate) fn select_list(fields: Vec<Field>) -> Vec<String> {
    let mut out = Vec::new();
    for field in fields {
        match field {
            Field::Table(name) => out.push(format!("{name}.*")),
            Field::Column(col) => out.push(col.qualified()),
            Field::Raw(raw) => out.extend(split_tokens(&raw, "select")),
        }
    }
    out
}

/// Resolve a from list: tables by name. Columns are dropped.
pub(crate) fn table_list(fields: Vec<Field>) -> Vec<String> {
    let mut out = Vec::new();
    for field in fields {
        match field {
            Field::Table(name) => out.push(name),
            Field::Raw(raw) => out.extend(split_tokens(&raw, "from")),
            other @ Field::Column(_) => dropped("from", &other),
        }
    }
    out
}

/// Resolve a group-by list: columns and strings. Tables are dropped.
pub(crate) fn group_list(fields: Vec<Field>) -> Vec<String> {
    let mut out = Vec::new();
    for field in fields {
        match field {
            Field::Column(col) => out.push(col.qualified()),
            Field::Raw(raw) => out.extend(split_tokens(&raw, "group")),
            other @ Field::Table(_) => dropped("group", &other),
        }
    }
    out
}

/// Resolve the single table of an into/update/delete clause. An invalid
/// string yields an empty target.
pub(crate) fn target_table(field: Field, clause: &'static str) -> String {
    match field {
        Field::Table(name) => name,
        Field::Raw(raw) => {
            let token = raw.trim();
            if is_safe_token(token) {
                token.to_string()
            } else {
                if !token.is_empty() {
                    tracing::trace!(target: "chainql.builder", clause, token, "dropped table");
                }
                String::new()
            }
        }
        other @ Field::Column(_) => {
            dropped(clause, &other);
            String::new()
        }
    }
}

/// Join kind. Anything unrecognised becomes a plain `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Plain,
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    /// Parse leniently: lower-cased and trimmed; unknown kinds yield `Plain`.
    pub fn parse(kind: &str) -> Self {
        let normalized = kind.trim().to_lowercase();
        match normalized.as_str() {
            "inner" => JoinKind::Inner,
            "left outer" => JoinKind::LeftOuter,
            "right outer" => JoinKind::RightOuter,
            "full outer" => JoinKind::FullOuter,
            "left" => JoinKind::Left,
            "right" => JoinKind::Right,
            "full" => JoinKind::Full,
            "cross" => JoinKind::Cross,
            "" => JoinKind::Plain,
            _ => {
                tracing::trace!(target: "chainql.builder", kind, "unsupported join kind");
                JoinKind::Plain
            }
        }
    }

    /// SQL keyword(s) preceding `join`; empty for a plain join.
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Plain => "",
            JoinKind::Inner => "inner",
            JoinKind::LeftOuter => "left outer",
            JoinKind::RightOuter => "right outer",
            JoinKind::FullOuter => "full outer",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Full => "full",
            JoinKind::Cross => "cross",
        }
    }
}

impl From<&str> for JoinKind {
    fn from(kind: &str) -> Self {
        JoinKind::parse(kind)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Strict parse: exactly `asc` or `desc` after trim and lower-casing.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Lenient parse: anything but `asc`/`desc` falls back to `asc`.
impl From<&str> for Direction {
    fn from(token: &str) -> Self {
        Direction::from_token(token).unwrap_or_default()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub field: String,
    pub direction: Direction,
}

/// Resolve an order-by argument into entries.
///
/// A column uses `direction`. A string is comma-split; each token is either
/// `field` (ascending) or `field asc|desc`; anything else is dropped.
pub(crate) fn order_entries(field: Field, direction: Direction) -> Vec<OrderEntry> {
    match field {
        Field::Column(col) => vec![OrderEntry {
            field: col.qualified(),
            direction,
        }],
        Field::Raw(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| {
                let entry = parse_order_token(token);
                if entry.is_none() {
                    tracing::trace!(target: "chainql.builder", clause = "order", token, "dropped token");
                }
                entry
            })
            .collect(),
        other @ Field::Table(_) => {
            dropped("order", &other);
            Vec::new()
        }
    }
}

fn parse_order_token(token: &str) -> Option<OrderEntry> {
    if token.contains(';') {
        return None;
    }
    let parts: Vec<&str> = token.split(' ').collect();
    match parts.as_slice() {
        [field] => Some(OrderEntry {
            field: field.to_string(),
            direction: Direction::Asc,
        }),
        [field, direction] => Direction::from_token(direction).map(|direction| OrderEntry {
            field: field.to_string(),
            direction,
        }),
        _ => None,
    }
}

/// One stored join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEntry {
    pub table: String,
    pub condition: String,
    pub kind: JoinKind,
}

/// Table argument of a join. Strings are taken verbatim, so aliases such as
/// `"brands b"` are allowed here.
pub(crate) fn join_table(field: Field) -> String {
    match field {
        Field::Table(name) => name,
        Field::Raw(raw) => raw,
        other @ Field::Column(_) => {
            dropped("join", &other);
            String::new()
        }
    }
}

/// A single condition for where/and/or/join.
///
/// Expressions are taken by value: a condition consumes the expression it
/// was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Expr(Expr),
    Column(Column),
    Raw(String),
}

impl Condition {
    /// Condition text; free-form strings are trimmed.
    pub(crate) fn into_text(self) -> String {
        match self {
            Condition::Expr(expr) => expr.into_sql(),
            Condition::Column(col) => col.qualified(),
            Condition::Raw(raw) => raw.trim().to_string(),
        }
    }
}

impl From<Expr> for Condition {
    fn from(expr: Expr) -> Self {
        Condition::Expr(expr)
    }
}

impl From<&Column> for Condition {
    fn from(col: &Column) -> Self {
        Condition::Column(col.clone())
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        Condition::Raw(raw.to_string())
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        Condition::Raw(raw)
    }
}

/// A limit or offset argument, coerced to an integer.
///
/// Integers are taken as-is, strings are parsed. Zero, `None` and
/// non-numeric strings mean "not applied".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bound(Option<u64>);

impl Bound {
    pub const NONE: Bound = Bound(None);

    fn from_i64(v: i64) -> Self {
        match v {
            0 => Bound(None),
            v => Bound(Some(v.unsigned_abs())),
        }
    }

    /// Absolute value of the bound, if applied.
    pub fn get(self) -> Option<u64> {
        self.0
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Bound::from_i64(v)
    }
}

impl From<i32> for Bound {
    fn from(v: i32) -> Self {
        Bound::from_i64(i64::from(v))
    }
}

impl From<u32> for Bound {
    fn from(v: u32) -> Self {
        Bound::from_i64(i64::from(v))
    }
}

impl From<&str> for Bound {
    fn from(s: &str) -> Self {
        s.trim().parse::<i64>().map_or(Bound(None), Bound::from_i64)
    }
}

impl From<String> for Bound {
    fn from(s: String) -> Self {
        Bound::from(s.as_str())
    }
}

impl From<Option<i64>> for Bound {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Bound(None), Bound::from_i64)
    }
}

impl From<()> for Bound {
    fn from(_: ()) -> Self {
        Bound(None)
    }
}

/// Stored limit text: `limit N[ offset M]`, or empty without a restriction.
pub(crate) fn limit_text(restriction: Bound, offset: Bound) -> String {
    match (restriction.get(), offset.get()) {
        (Some(limit), Some(offset)) => format!("limit {limit} offset {offset}"),
        (Some(limit), None) => format!("limit {limit}"),
        (None, _) => String::new(),
    }
}
