//! Terminal operations: render, trace, hand off to an [`Executor`].

use super::{Clauses, QueryBuilder};
use crate::client::{Executor, RowStream};
use crate::error::{ChainError, ChainResult};
use crate::grammar::Mode;
use crate::row::RowMap;

impl QueryBuilder {
    fn record(&mut self, mode: Mode, sql: Option<String>) -> Option<String> {
        if let Some(sql) = &sql {
            self.config.tracer.emit(mode, sql);
        }
        self.last_sql = sql.clone();
        sql
    }

    fn rendered_select(&mut self) -> ChainResult<String> {
        let sql = self.build_select()?;
        self.record(Mode::Select, Some(sql.clone()));
        Ok(sql)
    }

    /// Run the SELECT and stream its rows.
    pub async fn fetch<E: Executor>(&mut self, executor: &E) -> ChainResult<RowStream> {
        let sql = self.rendered_select()?;
        executor.run_query_stream(&sql).await
    }

    /// Run the SELECT and collect all rows.
    pub async fn fetch_all<E: Executor>(&mut self, executor: &E) -> ChainResult<Vec<RowMap>> {
        let sql = self.rendered_select()?;
        executor.run_query(&sql).await
    }

    /// Run the INSERT and return the id the executor reported.
    ///
    /// Returns `Ok(None)` without running anything when the statement renders
    /// to nothing.
    pub async fn insert_into<E: Executor>(&mut self, executor: &E) -> ChainResult<Option<i64>> {
        let rendered = self.build_insert()?;
        let Some(sql) = self.record(Mode::Insert, rendered) else {
            return Ok(None);
        };
        let outcome = executor.run_mutation(&sql).await?;
        match &mut self.clauses {
            Clauses::Insert(c) => c.id = outcome.last_inserted_id,
            _ => return Err(ChainError::inconsistent("not an insert statement")),
        }
        Ok(outcome.last_inserted_id)
    }

    /// Run the UPDATE. Nothing runs when the statement renders to nothing.
    pub async fn update_in<E: Executor>(&mut self, executor: &E) -> ChainResult<()> {
        let rendered = self.build_update()?;
        if let Some(sql) = self.record(Mode::Update, rendered) {
            executor.run_mutation(&sql).await?;
        }
        Ok(())
    }

    /// Run the DELETE. Nothing runs when the statement renders to nothing.
    pub async fn delete_from<E: Executor>(&mut self, executor: &E) -> ChainResult<()> {
        let rendered = self.build_delete()?;
        if let Some(sql) = self.record(Mode::Delete, rendered) {
            executor.run_mutation(&sql).await?;
        }
        Ok(())
    }
}
