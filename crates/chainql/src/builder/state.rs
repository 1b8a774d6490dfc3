//! Per-mode clause storage.

use super::fields::{JoinEntry, OrderEntry};
use crate::expr::Value;
use crate::grammar::Mode;

/// Accumulated SELECT clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectClauses {
    pub fields: Vec<String>,
    pub distinct: bool,
    pub tables: Vec<String>,
    pub joins: Vec<JoinEntry>,
    pub where_text: String,
    pub group: Vec<String>,
    pub having: String,
    pub order: Vec<OrderEntry>,
    /// `limit N[ offset M]`, or empty.
    pub limit: String,
}

/// Accumulated INSERT clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertClauses {
    /// Column name -> value, in the order supplied.
    pub data: Vec<(String, Value)>,
    pub into: String,
    /// Id reported by the executor after the insert ran.
    pub id: Option<i64>,
}

/// Accumulated UPDATE clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateClauses {
    pub table: String,
    pub data: Vec<(String, Value)>,
    pub where_text: String,
}

/// Accumulated DELETE clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteClauses {
    pub table: String,
    pub where_text: String,
}

/// Clause storage of the statement under construction.
///
/// Only the active mode's storage exists; entering a mode replaces it with
/// empty defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Clauses {
    #[default]
    Unset,
    Select(SelectClauses),
    Insert(InsertClauses),
    Update(UpdateClauses),
    Delete(DeleteClauses),
}

impl Clauses {
    /// Fresh, empty storage for `mode`.
    pub fn empty(mode: Mode) -> Self {
        match mode {
            Mode::Select => Clauses::Select(SelectClauses::default()),
            Mode::Insert => Clauses::Insert(InsertClauses::default()),
            Mode::Update => Clauses::Update(UpdateClauses::default()),
            Mode::Delete => Clauses::Delete(DeleteClauses::default()),
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        match self {
            Clauses::Unset => None,
            Clauses::Select(_) => Some(Mode::Select),
            Clauses::Insert(_) => Some(Mode::Insert),
            Clauses::Update(_) => Some(Mode::Update),
            Clauses::Delete(_) => Some(Mode::Delete),
        }
    }

    /// The where text of the active mode, if it has one.
    pub(crate) fn where_text_mut(&mut self) -> Option<&mut String> {
        match self {
            Clauses::Select(c) => Some(&mut c.where_text),
            Clauses::Update(c) => Some(&mut c.where_text),
            Clauses::Delete(c) => Some(&mut c.where_text),
            Clauses::Insert(_) | Clauses::Unset => None,
        }
    }
}
