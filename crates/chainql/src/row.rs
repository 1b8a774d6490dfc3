//! Row mapping: rows come back as column name -> JSON value mappings.

use crate::error::{ChainError, ChainResult};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};

/// One result row, keyed by column name in result order.
pub type RowMap = serde_json::Map<String, JsonValue>;

/// Decode a single column into `Option<T>`, mapping failures to [`ChainError::Decode`].
fn get<'a, T>(row: &'a Row, idx: usize, column: &str) -> ChainResult<Option<T>>
where
    T: FromSql<'a>,
{
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| ChainError::decode(column, e.to_string()))
}

/// How a column of a given Postgres type becomes a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnDecoder {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    /// Decimal text, so no precision is lost.
    #[cfg(feature = "rust_decimal")]
    Numeric,
    Text,
    Json,
    Uuid,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    /// `\x`-prefixed hex, the way Postgres prints bytea.
    Bytea,
    BoolArray,
    Int4Array,
    Int8Array,
    Float8Array,
    TextArray,
    /// Anything else maps to `null`.
    Unmapped,
}

impl ColumnDecoder {
    fn for_type(ty: &Type) -> Self {
        match *ty {
            Type::BOOL => Self::Bool,
            Type::INT2 => Self::Int2,
            Type::INT4 => Self::Int4,
            Type::INT8 => Self::Int8,
            Type::FLOAT4 => Self::Float4,
            Type::FLOAT8 => Self::Float8,
            #[cfg(feature = "rust_decimal")]
            Type::NUMERIC => Self::Numeric,
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => Self::Text,
            Type::JSON | Type::JSONB => Self::Json,
            Type::UUID => Self::Uuid,
            Type::TIMESTAMP => Self::Timestamp,
            Type::TIMESTAMPTZ => Self::TimestampTz,
            Type::DATE => Self::Date,
            Type::TIME => Self::Time,
            Type::BYTEA => Self::Bytea,
            Type::BOOL_ARRAY => Self::BoolArray,
            Type::INT4_ARRAY => Self::Int4Array,
            Type::INT8_ARRAY => Self::Int8Array,
            Type::FLOAT8_ARRAY => Self::Float8Array,
            Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => Self::TextArray,
            _ => Self::Unmapped,
        }
    }
}

fn bytea_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

fn column_value(row: &Row, idx: usize, column: &str, ty: &Type) -> ChainResult<JsonValue> {
    let value = match ColumnDecoder::for_type(ty) {
        ColumnDecoder::Bool => get::<bool>(row, idx, column)?.map(JsonValue::from),
        ColumnDecoder::Int2 => get::<i16>(row, idx, column)?.map(JsonValue::from),
        ColumnDecoder::Int4 => get::<i32>(row, idx, column)?.map(JsonValue::from),
        ColumnDecoder::Int8 => get::<i64>(row, idx, column)?.map(JsonValue::from),
        // Non-finite floats become null.
        ColumnDecoder::Float4 => {
            get::<f32>(row, idx, column)?.map(|v| JsonValue::from(f64::from(v)))
        }
        ColumnDecoder::Float8 => get::<f64>(row, idx, column)?.map(JsonValue::from),
        #[cfg(feature = "rust_decimal")]
        ColumnDecoder::Numeric => get::<rust_decimal::Decimal>(row, idx, column)?
            .map(|v| JsonValue::from(v.to_string())),
        ColumnDecoder::Text => get::<String>(row, idx, column)?.map(JsonValue::from),
        ColumnDecoder::Json => get::<JsonValue>(row, idx, column)?,
        ColumnDecoder::Uuid => {
            get::<uuid::Uuid>(row, idx, column)?.map(|v| JsonValue::from(v.to_string()))
        }
        ColumnDecoder::Timestamp => get::<chrono::NaiveDateTime>(row, idx, column)?
            .map(|v| JsonValue::from(v.format("%Y-%m-%d %H:%M:%S%.f").to_string())),
        ColumnDecoder::TimestampTz => get::<chrono::DateTime<chrono::Utc>>(row, idx, column)?
            .map(|v| JsonValue::from(v.to_rfc3339())),
        ColumnDecoder::Date => {
            get::<chrono::NaiveDate>(row, idx, column)?.map(|v| JsonValue::from(v.to_string()))
        }
        ColumnDecoder::Time => {
            get::<chrono::NaiveTime>(row, idx, column)?.map(|v| JsonValue::from(v.to_string()))
        }
        ColumnDecoder::Bytea => {
            get::<Vec<u8>>(row, idx, column)?.map(|v| JsonValue::from(bytea_hex(&v)))
        }
        ColumnDecoder::BoolArray => get::<Vec<Option<bool>>>(row, idx, column)?.map(JsonValue::from),
        ColumnDecoder::Int4Array => get::<Vec<Option<i32>>>(row, idx, column)?.map(JsonValue::from),
        ColumnDecoder::Int8Array => get::<Vec<Option<i64>>>(row, idx, column)?.map(JsonValue::from),
        ColumnDecoder::Float8Array => {
            get::<Vec<Option<f64>>>(row, idx, column)?.map(JsonValue::from)
        }
        ColumnDecoder::TextArray => {
            get::<Vec<Option<String>>>(row, idx, column)?.map(JsonValue::from)
        }
        ColumnDecoder::Unmapped => {
            tracing::trace!(
                target: "chainql.row",
                column,
                pg_type = ty.name(),
                "unmapped column type, returning null"
            );
            None
        }
    };
    Ok(value.unwrap_or(JsonValue::Null))
}

/// Convert a `tokio_postgres` row into a [`RowMap`].
///
/// Every column is present. Types without a mapping (intervals, ranges,
/// network types, ...) come back as `null` instead of failing the row.
pub fn row_to_map(row: &Row) -> ChainResult<RowMap> {
    let mut map = RowMap::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let value = column_value(row, idx, col.name(), col.type_())?;
        map.insert(col.name().to_string(), value);
    }
    Ok(map)
}

/// Deserialize a row mapping into a typed record.
///
/// ```
/// use chainql::row::{RowMap, from_row_map};
///
/// #[derive(serde::Deserialize)]
/// struct Brand {
///     id: i64,
///     name: String,
/// }
///
/// let mut row = RowMap::new();
/// row.insert("id".into(), 7.into());
/// row.insert("name".into(), "acme".into());
/// let brand: Brand = from_row_map(row).unwrap();
/// assert_eq!((brand.id, brand.name.as_str()), (7, "acme"));
/// ```
pub fn from_row_map<T: DeserializeOwned>(row: RowMap) -> ChainResult<T> {
    Ok(serde_json::from_value(JsonValue::Object(row))?)
}
