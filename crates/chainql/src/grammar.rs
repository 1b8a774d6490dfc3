//! Clause grammar: which clause marker may follow which, per statement mode.
//!
//! Each mode owns a static table mapping a marker to the set of markers that
//! may *immediately* precede it. `None` stands for "no clause set yet" and is
//! the only legal predecessor of a statement's opening clause.

use crate::error::{ChainError, ChainResult};
use std::fmt;

/// Statement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Select,
    Insert,
    Update,
    Delete,
}

impl Mode {
    /// The marker that opens a statement of this mode.
    pub fn entry_marker(self) -> Marker {
        match self {
            Mode::Select => Marker::Select,
            Mode::Insert => Marker::Insert,
            Mode::Update => Marker::Update,
            Mode::Delete => Marker::Delete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Select => "select",
            Mode::Insert => "insert",
            Mode::Update => "update",
            Mode::Delete => "delete",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clause marker: identifies the statement part most recently set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Select,
    From,
    Join,
    Where,
    /// Follow-up `and`/`or` condition appended to `where`.
    WhereMore,
    Group,
    Having,
    Order,
    Limit,
    Insert,
    Into,
    Update,
    Set,
    Delete,
}

impl Marker {
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Select => "select",
            Marker::From => "from",
            Marker::Join => "join",
            Marker::Where => "where",
            Marker::WhereMore => "where+",
            Marker::Group => "group",
            Marker::Having => "having",
            Marker::Order => "order",
            Marker::Limit => "limit",
            Marker::Insert => "insert",
            Marker::Into => "into",
            Marker::Update => "update",
            Marker::Set => "set",
            Marker::Delete => "delete",
        }
    }

    /// Render an optional marker, the empty marker being `""`.
    pub fn display_opt(marker: &Option<Marker>) -> &'static str {
        marker.map_or("", Marker::as_str)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Predecessors = &'static [Option<Marker>];

const OPENING: Predecessors = &[None];

const AFTER_TABLES: Predecessors = &[Some(Marker::From), Some(Marker::Join)];

const AFTER_WHERE: Predecessors = &[Some(Marker::Where), Some(Marker::WhereMore)];

const GROUP_PRED: Predecessors = &[
    Some(Marker::Where),
    Some(Marker::WhereMore),
    Some(Marker::From),
    Some(Marker::Join),
];

// `order` and `limit` share one predecessor set.
const TAIL_PRED: Predecessors = &[
    Some(Marker::From),
    Some(Marker::Join),
    Some(Marker::Where),
    Some(Marker::WhereMore),
    Some(Marker::Group),
    Some(Marker::Having),
    Some(Marker::Order),
];

/// Legal immediate predecessors of `marker` in `mode`, or `None` when the
/// marker has no entry in that mode's grammar.
pub fn predecessors(mode: Mode, marker: Marker) -> Option<Predecessors> {
    let preds: Predecessors = match (mode, marker) {
        (Mode::Select, Marker::Select) => OPENING,
        (Mode::Select, Marker::From) => &[Some(Marker::Select)],
        (Mode::Select, Marker::Join) => AFTER_TABLES,
        (Mode::Select, Marker::Where) => AFTER_TABLES,
        (Mode::Select, Marker::WhereMore) => AFTER_WHERE,
        (Mode::Select, Marker::Group) => GROUP_PRED,
        (Mode::Select, Marker::Having) => &[Some(Marker::Group)],
        (Mode::Select, Marker::Order) => TAIL_PRED,
        (Mode::Select, Marker::Limit) => TAIL_PRED,

        (Mode::Insert, Marker::Insert) => OPENING,
        (Mode::Insert, Marker::Into) => &[Some(Marker::Insert)],

        (Mode::Update, Marker::Update) => OPENING,
        (Mode::Update, Marker::Set) => &[Some(Marker::Update)],
        (Mode::Update, Marker::Where) => &[Some(Marker::Set)],

        (Mode::Delete, Marker::Delete) => OPENING,
        (Mode::Delete, Marker::Where) => &[Some(Marker::Delete)],

        _ => return None,
    };
    Some(preds)
}

/// Validate that `next` may directly follow `previous` in `mode`.
pub fn check(mode: Mode, previous: Option<Marker>, next: Marker) -> ChainResult<()> {
    let preds = predecessors(mode, next).ok_or(ChainError::UnknownClause { mode, marker: next })?;
    if preds.contains(&previous) {
        Ok(())
    } else {
        Err(ChainError::Sequence {
            current: next,
            previous,
        })
    }
}
