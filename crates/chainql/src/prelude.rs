//! Convenient imports for typical `chainql` usage.
//!
//! ```ignore
//! use chainql::prelude::*;
//! ```

pub use crate::{
    Catalog, ChainError, ChainResult, Column, ColumnType, Direction, Executor, JoinKind,
    Operators, QueryBuilder, RowMap, Table,
};

#[cfg(feature = "pool")]
pub use crate::create_pool;
