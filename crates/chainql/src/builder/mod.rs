//! Clause-ordered statement builder.
//!
//! [`QueryBuilder`] holds one statement under construction: its mode, the
//! current and previous clause markers, and the active mode's clause
//! storage. Every clause call is validated against the clause grammar
//! before anything is stored, and a rejected call leaves the builder as it
//! was.
//!
//! ```
//! use chainql::{Catalog, ColumnType, Operators, QueryBuilder, Table};
//!
//! let catalog = Catalog::new().with_table(
//!     Table::new("items")
//!         .with_column("id", ColumnType::Integer)
//!         .with_column("name", ColumnType::Text),
//! );
//! let items = &catalog["items"];
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(&items["id"])
//!     .from(items)?
//!     .where_(items["id"].greater_than(10)?)?
//!     .and(items["id"].less_than(20)?)?;
//! assert_eq!(
//!     qb.build_select()?,
//!     "select items.id from items where (items.id > 10) and (items.id < 20)"
//! );
//! # Ok::<(), chainql::ChainError>(())
//! ```

mod execute;
mod fields;
mod state;

pub use fields::{
    Bound, Condition, Direction, Field, IntoFields, JoinEntry, JoinKind, OrderEntry,
};
pub use state::{Clauses, DeleteClauses, InsertClauses, SelectClauses, UpdateClauses};

use crate::config::BuilderConfig;
use crate::error::{ChainError, ChainResult};
use crate::expr::Value;
use crate::grammar::{self, Marker, Mode};
use crate::render;

/// Builder for one statement at a time.
///
/// Not meant to be shared between statements built concurrently: entering a
/// mode discards whatever the previous statement stored.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: BuilderConfig,
    clauses: Clauses,
    current: Option<Marker>,
    previous: Option<Marker>,
    last_sql: Option<String>,
}

impl QueryBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a custom configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Active statement mode, if any.
    pub fn mode(&self) -> Option<Mode> {
        self.clauses.mode()
    }

    /// Marker of the clause set most recently.
    pub fn current_marker(&self) -> Option<Marker> {
        self.current
    }

    /// Marker that was current before the most recent clause.
    pub fn previous_marker(&self) -> Option<Marker> {
        self.previous
    }

    /// Clause storage of the statement under construction.
    pub fn clauses(&self) -> &Clauses {
        &self.clauses
    }

    /// The last statement handed to an executor (`None` when the last
    /// terminal call rendered nothing).
    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    /// Id captured by the last [`QueryBuilder::insert_into`].
    pub fn last_insert_id(&self) -> Option<i64> {
        match &self.clauses {
            Clauses::Insert(c) => c.id,
            _ => None,
        }
    }

    // ==================== State machine ====================

    fn enter(&mut self, mode: Mode) {
        self.clauses = Clauses::empty(mode);
        self.previous = None;
        self.current = Some(mode.entry_marker());
    }

    fn require_mode(&self, marker: Marker) -> ChainResult<Mode> {
        self.mode().ok_or_else(|| {
            ChainError::inconsistent(format!("'{marker}' called before a statement was started"))
        })
    }

    /// Validate `marker` against the grammar, then make it current.
    fn advance(&mut self, marker: Marker) -> ChainResult<()> {
        let mode = self.require_mode(marker)?;
        grammar::check(mode, self.current, marker)?;
        self.previous = self.current;
        self.current = Some(marker);
        Ok(())
    }

    fn select_mut(&mut self) -> ChainResult<&mut SelectClauses> {
        match &mut self.clauses {
            Clauses::Select(c) => Ok(c),
            _ => Err(ChainError::inconsistent("not a select statement")),
        }
    }

    fn insert_mut(&mut self) -> ChainResult<&mut InsertClauses> {
        match &mut self.clauses {
            Clauses::Insert(c) => Ok(c),
            _ => Err(ChainError::inconsistent("not an insert statement")),
        }
    }

    fn update_mut(&mut self) -> ChainResult<&mut UpdateClauses> {
        match &mut self.clauses {
            Clauses::Update(c) => Ok(c),
            _ => Err(ChainError::inconsistent("not an update statement")),
        }
    }

    fn where_mut(&mut self) -> ChainResult<&mut String> {
        self.clauses
            .where_text_mut()
            .ok_or_else(|| ChainError::inconsistent("statement has no where clause"))
    }

    // ==================== SELECT ====================

    /// Start a SELECT with the given field list. An empty list selects `*`.
    ///
    /// Tables expand to `<table>.*` and columns to `<table>.<column>`.
    /// Strings are comma-split; tokens containing a space or a semicolon are
    /// dropped.
    pub fn select(&mut self, fields: impl IntoFields) -> &mut Self {
        self.start_select(fields, false)
    }

    /// Start a `SELECT DISTINCT`. The flag is only kept when the resolved
    /// field list is non-empty.
    pub fn select_distinct(&mut self, fields: impl IntoFields) -> &mut Self {
        self.start_select(fields, true)
    }

    fn start_select(&mut self, fields: impl IntoFields, distinct: bool) -> &mut Self {
        let fields = fields::select_list(fields.into_fields());
        let distinct = distinct && !fields.is_empty();
        self.enter(Mode::Select);
        self.clauses = Clauses::Select(SelectClauses {
            fields,
            distinct,
            ..SelectClauses::default()
        });
        self
    }

    /// Set the table list, replacing any earlier one.
    pub fn from(&mut self, tables: impl IntoFields) -> ChainResult<&mut Self> {
        self.advance(Marker::From)?;
        self.select_mut()?.tables = fields::table_list(tables.into_fields());
        Ok(self)
    }

    /// Append a join.
    ///
    /// The entry is only stored when both the table and the condition are
    /// non-empty. Unknown join kinds render as a plain `join`.
    pub fn join(
        &mut self,
        table: impl Into<Field>,
        condition: impl Into<Condition>,
        kind: impl Into<JoinKind>,
    ) -> ChainResult<&mut Self> {
        self.advance(Marker::Join)?;
        let entry = join_entry(table.into(), condition.into(), kind.into());
        self.select_mut()?.joins.extend(entry);
        Ok(self)
    }

    /// Replace all joins with a single one.
    pub fn set_join(
        &mut self,
        table: impl Into<Field>,
        condition: impl Into<Condition>,
        kind: impl Into<JoinKind>,
    ) -> ChainResult<&mut Self> {
        self.advance(Marker::Join)?;
        let entry = join_entry(table.into(), condition.into(), kind.into());
        self.select_mut()?.joins = entry.into_iter().collect();
        Ok(self)
    }

    /// Set the where condition, replacing any earlier one.
    ///
    /// Valid for select, update and delete statements.
    pub fn where_(&mut self, condition: impl Into<Condition>) -> ChainResult<&mut Self> {
        self.advance(Marker::Where)?;
        *self.where_mut()? = condition.into().into_text();
        Ok(self)
    }

    /// Append `and <condition>` to the where text, without grouping the
    /// existing text.
    ///
    /// An empty condition clears the where text.
    pub fn and(&mut self, condition: impl Into<Condition>) -> ChainResult<&mut Self> {
        self.extend_where("and", condition.into())
    }

    /// Append `or <condition>` to the where text, without grouping the
    /// existing text.
    ///
    /// An empty condition clears the where text.
    pub fn or(&mut self, condition: impl Into<Condition>) -> ChainResult<&mut Self> {
        self.extend_where("or", condition.into())
    }

    fn extend_where(&mut self, op: &str, condition: Condition) -> ChainResult<&mut Self> {
        self.advance(Marker::WhereMore)?;
        let where_text = self.where_mut()?;
        let next = condition.into_text();
        *where_text = if next.is_empty() {
            next
        } else {
            format!("{where_text} {op} {next}")
        };
        Ok(self)
    }

    /// Set the group-by list (columns and strings), replacing any earlier one.
    pub fn group_by(&mut self, fields: impl IntoFields) -> ChainResult<&mut Self> {
        self.advance(Marker::Group)?;
        self.select_mut()?.group = fields::group_list(fields.into_fields());
        Ok(self)
    }

    /// Set the having text.
    ///
    /// Fails with [`ChainError::MissingClause`] when the group-by list is
    /// empty, whatever `expression` holds. Text containing a semicolon is
    /// dropped.
    pub fn having(&mut self, expression: &str) -> ChainResult<&mut Self> {
        self.require_mode(Marker::Having)?;
        if let Clauses::Select(c) = &self.clauses
            && c.group.is_empty()
        {
            return Err(ChainError::missing("group by is not defined"));
        }
        self.advance(Marker::Having)?;

        let expression = expression.trim();
        let having = if expression.contains(';') {
            tracing::trace!(target: "chainql.builder", clause = "having", expression, "dropped expression");
            String::new()
        } else {
            expression.to_string()
        };
        self.select_mut()?.having = having;
        Ok(self)
    }

    /// Append order entries.
    ///
    /// A column is ordered by `direction`. A string is comma-split into
    /// `field` or `field asc|desc` tokens and `direction` is ignored.
    pub fn order_by(
        &mut self,
        field: impl Into<Field>,
        direction: impl Into<Direction>,
    ) -> ChainResult<&mut Self> {
        self.advance(Marker::Order)?;
        let entries = fields::order_entries(field.into(), direction.into());
        self.select_mut()?.order.extend(entries);
        Ok(self)
    }

    /// Replace the order entries.
    pub fn set_order_by(
        &mut self,
        field: impl Into<Field>,
        direction: impl Into<Direction>,
    ) -> ChainResult<&mut Self> {
        self.advance(Marker::Order)?;
        let entries = fields::order_entries(field.into(), direction.into());
        self.select_mut()?.order = entries;
        Ok(self)
    }

    /// Set `limit <restriction>[ offset <offset>]`.
    ///
    /// Both are coerced to integers and their absolute value is used. The
    /// offset is only kept together with a restriction. Whether the limit is
    /// rendered is up to the `render_limit` setting of [`BuilderConfig`].
    pub fn limit(
        &mut self,
        restriction: impl Into<Bound>,
        offset: impl Into<Bound>,
    ) -> ChainResult<&mut Self> {
        self.advance(Marker::Limit)?;
        self.select_mut()?.limit = fields::limit_text(restriction.into(), offset.into());
        Ok(self)
    }

    // ==================== INSERT ====================

    /// Start an INSERT with `column -> value` pairs, kept in iteration order.
    ///
    /// Only integer and string values are rendered; other values are
    /// dropped with their column.
    pub fn insert<K, V, I>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.enter(Mode::Insert);
        let data = collect_data(data);
        self.clauses = Clauses::Insert(InsertClauses {
            data,
            ..InsertClauses::default()
        });
        self
    }

    /// Set the insert target table.
    pub fn into_table(&mut self, table: impl Into<Field>) -> ChainResult<&mut Self> {
        self.advance(Marker::Into)?;
        self.insert_mut()?.into = fields::target_table(table.into(), "into");
        Ok(self)
    }

    // ==================== UPDATE ====================

    /// Start an UPDATE of `table`.
    pub fn update(&mut self, table: impl Into<Field>) -> &mut Self {
        let table = fields::target_table(table.into(), "update");
        self.enter(Mode::Update);
        self.clauses = Clauses::Update(UpdateClauses {
            table,
            ..UpdateClauses::default()
        });
        self
    }

    /// Set the assignments. An empty mapping keeps the earlier data.
    pub fn set<K, V, I>(&mut self, data: I) -> ChainResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.advance(Marker::Set)?;
        let data = collect_data(data);
        if !data.is_empty() {
            self.update_mut()?.data = data;
        }
        Ok(self)
    }

    // ==================== DELETE ====================

    /// Start a DELETE from `table`.
    pub fn delete(&mut self, table: impl Into<Field>) -> &mut Self {
        let table = fields::target_table(table.into(), "delete");
        self.enter(Mode::Delete);
        self.clauses = Clauses::Delete(DeleteClauses {
            table,
            ..DeleteClauses::default()
        });
        self
    }

    // ==================== Rendering ====================

    /// Render the SELECT under construction.
    pub fn build_select(&self) -> ChainResult<String> {
        match &self.clauses {
            Clauses::Select(c) => render::render_select(c, self.config.render_limit),
            _ => Err(ChainError::inconsistent("not a select statement")),
        }
    }

    /// Render the INSERT under construction; `None` without data or table.
    pub fn build_insert(&self) -> ChainResult<Option<String>> {
        match &self.clauses {
            Clauses::Insert(c) => Ok(render::render_insert(c)),
            _ => Err(ChainError::inconsistent("not an insert statement")),
        }
    }

    /// Render the UPDATE under construction; `None` without data or table.
    pub fn build_update(&self) -> ChainResult<Option<String>> {
        match &self.clauses {
            Clauses::Update(c) => Ok(render::render_update(c)),
            _ => Err(ChainError::inconsistent("not an update statement")),
        }
    }

    /// Render the DELETE under construction; `None` without table.
    pub fn build_delete(&self) -> ChainResult<Option<String>> {
        match &self.clauses {
            Clauses::Delete(c) => Ok(render::render_delete(c)),
            _ => Err(ChainError::inconsistent("not a delete statement")),
        }
    }

    /// Render whatever statement is under construction.
    pub fn build_sql(&self) -> ChainResult<Option<String>> {
        match self.mode() {
            Some(Mode::Select) => self.build_select().map(Some),
            Some(Mode::Insert) => self.build_insert(),
            Some(Mode::Update) => self.build_update(),
            Some(Mode::Delete) => self.build_delete(),
            None => Err(ChainError::inconsistent("no statement was started")),
        }
    }
}

fn join_entry(table: Field, condition: Condition, kind: JoinKind) -> Option<JoinEntry> {
    let table = fields::join_table(table);
    let condition = condition.into_text();
    if table.is_empty() || condition.is_empty() {
        return None;
    }
    Some(JoinEntry {
        table,
        condition,
        kind,
    })
}

fn collect_data<K, V, I>(data: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    data.into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests;
