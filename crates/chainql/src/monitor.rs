//! `tracing` events for rendered statements.

use crate::grammar::Mode;
use tracing::Level;

/// Emits one `tracing` event per statement handed to an executor.
///
/// Events go to target `chainql.sql` with fields `statement` and `sql`.
#[derive(Debug, Clone)]
pub struct SqlTracer {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlTracer {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl SqlTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub(crate) fn emit(&self, mode: Mode, sql: &str) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: "chainql.sql",
            statement = mode.as_str(),
            sql = %sql,
        );
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_limit() {
        let tracer = SqlTracer::new().max_sql_length(10);
        assert_eq!(tracer.truncate_sql("select * from items"), "select * f...");
        assert_eq!(tracer.truncate_sql("select 1"), "select 1");
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let tracer = SqlTracer::new().max_sql_length(5);
        // 'é' is two bytes and straddles the limit.
        assert_eq!(tracer.truncate_sql("'abcé'"), "'abc...");
    }

    #[test]
    fn test_no_truncate() {
        let sql = "x".repeat(500);
        assert_eq!(SqlTracer::new().no_truncate().truncate_sql(&sql), sql);
        assert_eq!(SqlTracer::new().truncate_sql(&sql).len(), 203);
    }
}
