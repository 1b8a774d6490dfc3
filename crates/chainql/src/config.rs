use crate::monitor::SqlTracer;

/// Configuration for [`QueryBuilder`](crate::QueryBuilder).
#[derive(Debug, Clone, Default)]
pub struct BuilderConfig {
    /// Append the stored `limit N[ offset M]` text to SELECT statements.
    ///
    /// Off by default: a SELECT is rendered without its limit clause even
    /// when one was set.
    pub render_limit: bool,
    /// Level and truncation for SQL events.
    pub tracer: SqlTracer,
}

impl BuilderConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle limit rendering for SELECT statements.
    pub fn render_limit(mut self, enabled: bool) -> Self {
        self.render_limit = enabled;
        self
    }

    /// Replace the SQL tracer.
    pub fn tracer(mut self, tracer: SqlTracer) -> Self {
        self.tracer = tracer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_defaults() {
        let cfg = BuilderConfig::new();
        assert!(!cfg.render_limit);
        assert_eq!(cfg.tracer.level, Level::DEBUG);
        assert_eq!(cfg.tracer.max_sql_length, Some(200));
    }

    #[test]
    fn test_setters_chain() {
        let cfg = BuilderConfig::new()
            .render_limit(true)
            .tracer(SqlTracer::new().level(Level::INFO).no_truncate());
        assert!(cfg.render_limit);
        assert_eq!(cfg.tracer.level, Level::INFO);
        assert!(cfg.tracer.max_sql_length.is_none());
    }
}
