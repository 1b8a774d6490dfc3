//! # chainql
//!
//! A chainable SQL statement builder over table/column descriptors.
//!
//! ## Features
//!
//! - **Typed conditions**: columns combine into comparison, boolean and
//!   membership fragments; comparisons check that both sides have the same kind
//! - **Clause order checking**: each statement mode has a fixed grammar of
//!   which clause may follow which, enforced on every call
//! - **Deterministic rendering**: statement text is assembled on demand in a
//!   fixed clause order
//! - **Pluggable execution**: rendered statements are handed to an
//!   [`Executor`]; `tokio_postgres` clients (and pooled clients with the
//!   `pool` feature) implement it
//!
//! Values are inlined as literals, not bound as parameters. String literals
//! are quoted without escaping and the free-form token guard only rejects
//! spaces and semicolons, so never feed untrusted input into a builder.
//!
//! ## Example
//!
//! ```
//! use chainql::prelude::*;
//!
//! let catalog = Catalog::from_json(r#"{"tables": [
//!     {"name": "brands", "columns": [
//!         {"name": "id", "type": "INTEGER", "primary_key": true},
//!         {"name": "name", "type": "TEXT"}
//!     ]}
//! ]}"#)?;
//! let brands = &catalog["brands"];
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(brands)
//!     .from(brands)?
//!     .where_(brands["id"].is_in([1, 2, 3]))?
//!     .order_by("name desc", Direction::Asc)?;
//! assert_eq!(
//!     qb.build_select()?,
//!     "select brands.* from brands where (brands.id in (1, 2, 3)) order by name desc"
//! );
//!
//! qb.insert([("name", "a"), ("description", "b")]).into_table(brands)?;
//! assert_eq!(
//!     qb.build_insert()?.as_deref(),
//!     Some("insert into brands (name, description) values ('a', 'b')")
//! );
//! # Ok::<(), chainql::ChainError>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod expr;
pub mod grammar;
pub mod monitor;
pub mod prelude;
pub mod render;
pub mod row;

pub use builder::{
    Bound, Clauses, Condition, Direction, Field, IntoFields, JoinKind, OrderEntry, QueryBuilder,
};
pub use catalog::{Catalog, Column, ColumnType, SchemaDescription, Table};
pub use client::{Executor, MutationOutcome, RowStream};
pub use config::BuilderConfig;
pub use error::{ChainError, ChainResult};
pub use expr::{Expr, ExprNode, IntoMembers, Kind, Members, Operand, Operators, Value};
pub use grammar::{Marker, Mode};
pub use monitor::SqlTracer;
pub use row::{RowMap, from_row_map};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_size};
