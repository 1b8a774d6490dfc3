//! Execution adapter: the narrow contract rendered statements are handed to.

use crate::error::{ChainError, ChainResult};
use crate::row::{RowMap, row_to_map};
use futures_core::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;

/// Result of a data-changing statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub rows_affected: u64,
    /// Id generated by the statement, when the adapter can report one.
    pub last_inserted_id: Option<i64>,
}

/// Something that can run rendered statements.
///
/// Each call is scoped to one statement; commit semantics belong to the
/// implementation (the Postgres impls autocommit per statement).
pub trait Executor: Send + Sync {
    /// Run a row-returning statement and collect all rows.
    fn run_query(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = ChainResult<Vec<RowMap>>> + Send;

    /// Run a row-returning statement and return a [`RowStream`].
    ///
    /// The default implementation collects via [`Executor::run_query`] and
    /// streams the buffered rows.
    fn run_query_stream(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = ChainResult<RowStream>> + Send {
        async move {
            let rows = self.run_query(sql).await?;
            Ok(RowStream::from_rows(rows))
        }
    }

    /// Run a data-changing statement.
    fn run_mutation(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = ChainResult<MutationOutcome>> + Send;
}

/// A stream of mapped rows.
///
/// Type-erased so that different executors can return different underlying
/// streams.
pub struct RowStream {
    inner: Pin<Box<dyn Stream<Item = ChainResult<RowMap>> + Send>>,
}

impl RowStream {
    /// Create a new `RowStream` from any compatible stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = ChainResult<RowMap>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Stream rows that are already in memory.
    pub fn from_rows(rows: Vec<RowMap>) -> Self {
        Self::new(BufferedRows {
            rows: rows.into_iter(),
        })
    }
}

impl Stream for RowStream {
    type Item = ChainResult<RowMap>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream").finish_non_exhaustive()
    }
}

struct BufferedRows {
    rows: std::vec::IntoIter<RowMap>,
}

impl Stream for BufferedRows {
    type Item = ChainResult<RowMap>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.rows.next().map(Ok))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

struct MapPgRowStream<S> {
    inner: Pin<Box<S>>,
}

impl<S> MapPgRowStream<S> {
    fn new(stream: S) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl<S> Stream for MapPgRowStream<S>
where
    S: Stream<Item = Result<Row, tokio_postgres::Error>> + Send + 'static,
{
    type Item = ChainResult<RowMap>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(row_to_map(&row))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(ChainError::from(e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn ensure_open(client: &tokio_postgres::Client) -> ChainResult<()> {
    if client.is_closed() {
        Err(ChainError::adapter("connection is closed"))
    } else {
        Ok(())
    }
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("insert "))
}

/// `lastval()` for the session, or `None` when no sequence was used yet.
async fn last_value(client: &tokio_postgres::Client) -> ChainResult<Option<i64>> {
    match client.query_one("SELECT lastval()", &[]).await {
        Ok(row) => Ok(row.try_get::<_, Option<i64>>(0).unwrap_or(None)),
        Err(e) if e.code() == Some(&SqlState::OBJECT_NOT_IN_PREREQUISITE_STATE) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Executor for tokio_postgres::Client {
    async fn run_query(&self, sql: &str) -> ChainResult<Vec<RowMap>> {
        ensure_open(self)?;
        let rows = tokio_postgres::Client::query(self, sql, &[]).await?;
        rows.iter().map(row_to_map).collect()
    }

    async fn run_query_stream(&self, sql: &str) -> ChainResult<RowStream> {
        ensure_open(self)?;
        let params: &[&(dyn ToSql + Sync)] = &[];
        let stream = tokio_postgres::Client::query_raw(self, sql, params.iter().copied()).await?;
        Ok(RowStream::new(MapPgRowStream::new(stream)))
    }

    async fn run_mutation(&self, sql: &str) -> ChainResult<MutationOutcome> {
        ensure_open(self)?;
        let rows_affected = tokio_postgres::Client::execute(self, sql, &[]).await?;
        let last_inserted_id = if is_insert(sql) {
            last_value(self).await?
        } else {
            None
        };
        Ok(MutationOutcome {
            rows_affected,
            last_inserted_id,
        })
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    async fn run_query(&self, sql: &str) -> ChainResult<Vec<RowMap>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        Executor::run_query(&**self, sql).await
    }

    async fn run_query_stream(&self, sql: &str) -> ChainResult<RowStream> {
        Executor::run_query_stream(&**self, sql).await
    }

    async fn run_mutation(&self, sql: &str) -> ChainResult<MutationOutcome> {
        Executor::run_mutation(&**self, sql).await
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::ClientWrapper {
    async fn run_query(&self, sql: &str) -> ChainResult<Vec<RowMap>> {
        Executor::run_query(&**self, sql).await
    }

    async fn run_query_stream(&self, sql: &str) -> ChainResult<RowStream> {
        Executor::run_query_stream(&**self, sql).await
    }

    async fn run_mutation(&self, sql: &str) -> ChainResult<MutationOutcome> {
        Executor::run_mutation(&**self, sql).await
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn run_query(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = ChainResult<Vec<RowMap>>> + Send {
        (**self).run_query(sql)
    }

    fn run_query_stream(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = ChainResult<RowStream>> + Send {
        (**self).run_query_stream(sql)
    }

    fn run_mutation(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = ChainResult<MutationOutcome>> + Send {
        (**self).run_mutation(sql)
    }
}
