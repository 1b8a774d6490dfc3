//! Read-only catalog of table and column descriptors.
//!
//! The catalog is built once from a schema description (programmatically or
//! from JSON) and is immutable afterwards, so it can be shared freely across
//! threads while separate [`QueryBuilder`](crate::QueryBuilder)s read it.

use crate::error::ChainResult;
use crate::expr::Kind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// Declared column type, as reported by the storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Text,
    Varchar,
    Real,
    /// Any other engine type name, kept verbatim.
    Other(String),
}

impl ColumnType {
    /// Map an engine type name to a declared type (case-insensitive).
    pub fn from_decl(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "integer" | "int" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "serial"
            | "bigserial" => ColumnType::Integer,
            "text" => ColumnType::Text,
            "varchar" | "character varying" | "char" | "character" | "bpchar" | "name" => {
                ColumnType::Varchar
            }
            "real" | "float" | "float4" | "float8" | "double" | "double precision" => {
                ColumnType::Real
            }
            _ => ColumnType::Other(name.trim().to_string()),
        }
    }

    /// Semantic kind used for operand validation.
    pub fn kind(&self) -> Kind {
        match self {
            ColumnType::Integer => Kind::Integer,
            ColumnType::Text | ColumnType::Varchar => Kind::Text,
            ColumnType::Real => Kind::Real,
            ColumnType::Other(_) => Kind::Unknown,
        }
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        ColumnType::from_decl(name)
    }
}

/// A base column descriptor: a direct schema column of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    table: String,
    ty: ColumnType,
    primary_key: bool,
}

impl Column {
    /// Create a column descriptor owned by `table`.
    pub fn new(table: impl Into<String>, name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            ty,
            primary_key: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning table.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.ty
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Qualified reference, always `<table>.<name>`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    pub(crate) fn kind(&self) -> Kind {
        self.ty.kind()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// A table descriptor with its columns keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: BTreeMap<String, Column>,
}

impl Table {
    /// Create an empty table descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Add a column. A column with the same name replaces the earlier one.
    pub fn with_column(mut self, name: impl Into<String>, ty: impl Into<ColumnType>) -> Self {
        let column = Column::new(self.name.clone(), name, ty.into());
        self.columns.insert(column.name.clone(), column);
        self
    }

    /// Add a column and mark it as the primary key.
    pub fn with_primary_key(mut self, name: impl Into<String>, ty: impl Into<ColumnType>) -> Self {
        let mut column = Column::new(self.name.clone(), name, ty.into());
        column.primary_key = true;
        self.columns.insert(column.name.clone(), column);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Columns in name order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.values().find(|c| c.primary_key)
    }
}

impl Index<&str> for Table {
    type Output = Column;

    /// Panics if the table has no such column; use [`Table::column`] to probe.
    fn index(&self, name: &str) -> &Column {
        match self.columns.get(name) {
            Some(column) => column,
            None => panic!("table '{}' has no column '{}'", self.name, name),
        }
    }
}

/// Catalog of tables keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table descriptor.
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Build a catalog from a schema description.
    pub fn from_description(desc: SchemaDescription) -> Self {
        desc.tables
            .into_iter()
            .fold(Catalog::new(), |catalog, table_desc| {
                let table = table_desc.columns.into_iter().fold(
                    Table::new(table_desc.name),
                    |table, col| {
                        let ty = ColumnType::from_decl(&col.r#type);
                        if col.primary_key {
                            table.with_primary_key(col.name, ty)
                        } else {
                            table.with_column(col.name, ty)
                        }
                    },
                );
                catalog.with_table(table)
            })
    }

    /// Parse a JSON schema description and build the catalog.
    ///
    /// ```
    /// let catalog = chainql::Catalog::from_json(
    ///     r#"{"tables": [{"name": "items", "columns": [{"name": "id", "type": "INTEGER"}]}]}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(catalog["items"]["id"].qualified(), "items.id");
    /// ```
    pub fn from_json(json: &str) -> ChainResult<Self> {
        let desc: SchemaDescription = serde_json::from_str(json)?;
        Ok(Self::from_description(desc))
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Index<&str> for Catalog {
    type Output = Table;

    /// Panics if the catalog has no such table; use [`Catalog::table`] to probe.
    fn index(&self, name: &str) -> &Table {
        match self.tables.get(name) {
            Some(table) => table,
            None => panic!("catalog has no table '{}'", name),
        }
    }
}

/// Serializable schema description the catalog is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub tables: Vec<TableDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescription {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    /// Engine type name, e.g. `INTEGER` or `character varying`.
    pub r#type: String,
    #[serde(default)]
    pub primary_key: bool,
}
