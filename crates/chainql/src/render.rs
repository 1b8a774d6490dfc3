//! Statement rendering.
//!
//! Pure functions over accumulated clause storage. Output is deterministic:
//! clause order is fixed and list order is insertion order.

use crate::builder::{DeleteClauses, InsertClauses, SelectClauses, UpdateClauses};
use crate::error::{ChainError, ChainResult};
use crate::expr::Value;

/// Render a SELECT.
///
/// Fails with [`ChainError::MissingClause`] when no table was given. Every
/// order entry renders its own `order by` clause. The stored limit text is
/// only appended when `render_limit` is set.
pub fn render_select(clauses: &SelectClauses, render_limit: bool) -> ChainResult<String> {
    if clauses.tables.is_empty() {
        return Err(ChainError::missing("wrong query parameters"));
    }

    let fields = if clauses.fields.is_empty() {
        "*".to_string()
    } else {
        clauses.fields.join(", ")
    };
    let mut sql = if clauses.distinct {
        format!("select distinct {} from {}", fields, clauses.tables.join(", "))
    } else {
        format!("select {} from {}", fields, clauses.tables.join(", "))
    };

    if !clauses.joins.is_empty() {
        let joins: Vec<String> = clauses
            .joins
            .iter()
            .map(|j| {
                format!("{} join {} on {}", j.kind, j.table, j.condition)
                    .trim()
                    .to_string()
            })
            .collect();
        sql.push(' ');
        sql.push_str(&joins.join(" "));
    }
    if !clauses.where_text.is_empty() {
        sql.push_str(" where ");
        sql.push_str(&clauses.where_text);
    }
    if !clauses.group.is_empty() {
        sql.push_str(" group by ");
        sql.push_str(&clauses.group.join(", "));
    }
    if !clauses.having.is_empty() {
        sql.push_str(" having ");
        sql.push_str(&clauses.having);
    }
    for entry in &clauses.order {
        sql.push_str(&format!(" order by {} {}", entry.field, entry.direction));
    }
    if render_limit && !clauses.limit.is_empty() {
        sql.push(' ');
        sql.push_str(&clauses.limit);
    }
    Ok(sql)
}

/// Pairs whose value can be inlined (integers and strings). Other values
/// are dropped together with their column.
fn assignable(data: &[(String, Value)]) -> impl Iterator<Item = (&str, String)> {
    data.iter().filter_map(|(column, value)| match value {
        Value::Integer(_) | Value::Text(_) => Some((column.as_str(), value.render())),
        Value::Real(_) => {
            tracing::trace!(target: "chainql.builder", column = %column, "dropped unsupported value");
            None
        }
    })
}

/// Render an INSERT, or `None` without data or target table.
pub fn render_insert(clauses: &InsertClauses) -> Option<String> {
    let (fields, values): (Vec<&str>, Vec<String>) = assignable(&clauses.data).unzip();
    if fields.is_empty() || clauses.into.is_empty() {
        return None;
    }
    Some(format!(
        "insert into {} ({}) values ({})",
        clauses.into,
        fields.join(", "),
        values.join(", ")
    ))
}

/// Render an UPDATE, or `None` without data or target table.
pub fn render_update(clauses: &UpdateClauses) -> Option<String> {
    let assignments: Vec<String> = assignable(&clauses.data)
        .map(|(column, value)| format!("{column} = {value}"))
        .collect();
    if assignments.is_empty() || clauses.table.is_empty() {
        return None;
    }
    let mut sql = format!("update {} set {}", clauses.table, assignments.join(", "));
    if !clauses.where_text.is_empty() {
        sql.push_str(" where ");
        sql.push_str(&clauses.where_text);
    }
    Some(sql)
}

/// Render a DELETE, or `None` without target table.
pub fn render_delete(clauses: &DeleteClauses) -> Option<String> {
    if clauses.table.is_empty() {
        return None;
    }
    let mut sql = format!("delete from {}", clauses.table);
    if !clauses.where_text.is_empty() {
        sql.push_str(" where ");
        sql.push_str(&clauses.where_text);
    }
    Some(sql)
}
