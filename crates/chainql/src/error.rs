//! Error types for chainql

use crate::expr::Kind;
use crate::grammar::{Marker, Mode};
use thiserror::Error;

/// Result type alias for chainql operations
pub type ChainResult<T> = Result<T, ChainError>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum ChainError {
    /// Comparison between operands of different semantic kinds
    #[error("type mismatch: {left} != {right}")]
    TypeMismatch { left: Kind, right: Kind },

    /// Clause called out of its legal order for the current mode
    #[error("wrong query parts sequence: '{current}' can't be after '{}'", Marker::display_opt(.previous))]
    Sequence {
        current: Marker,
        previous: Option<Marker>,
    },

    /// Clause has no grammar entry in the current mode
    #[error("wrong query part: '{marker}' is not part of a {mode} statement")]
    UnknownClause { mode: Mode, marker: Marker },

    /// Clause or render call made without (or with the wrong) statement mode
    #[error("inconsistent query: {0}")]
    InconsistentState(String),

    /// A clause the call depends on was never set
    #[error("{0}")]
    MissingClause(String),

    /// Execution adapter misuse
    #[error("wrong db connection: {0}")]
    Adapter(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Schema description could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl ChainError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a missing clause error
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingClause(message.into())
    }

    /// Create an inconsistent state error
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentState(message.into())
    }

    /// Create an adapter error
    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter(message.into())
    }

    /// Check if this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Check if this is a clause sequence error
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence { .. })
    }

    /// Check if this is a missing clause error
    pub fn is_missing_clause(&self) -> bool {
        matches!(self, Self::MissingClause(_))
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for ChainError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
