//! The executor seam: anything that can run SQL with bound parameters.

use crate::config::PlaceholderStyle;
use crate::error::{QueryError, QueryResult};
use crate::types::Value;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Runs one compiled query and returns its rows.
///
/// Implementations own connection handling, retries, timeouts and
/// cancellation; the builder calls `execute` exactly once per fetch and
/// propagates failures unchanged.
pub trait QueryExecutor: Send + Sync {
    /// Row type produced by the driver. The builder never inspects it.
    type Row: Send;

    /// Placeholder spelling this executor's driver understands.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    /// Execute `sql` with `params` bound in order.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = QueryResult<Vec<Self::Row>>> + Send;
}

impl<E: QueryExecutor> QueryExecutor for &E {
    type Row = E::Row;

    fn placeholder_style(&self) -> PlaceholderStyle {
        (**self).placeholder_style()
    }

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = QueryResult<Vec<Self::Row>>> + Send {
        (**self).execute(sql, params)
    }
}

/// Rows that can be read as a single count value (the first column).
pub trait CountRow {
    fn count(&self) -> QueryResult<i64>;
}

impl CountRow for Row {
    fn count(&self) -> QueryResult<i64> {
        Ok(self.try_get::<_, i64>(0)?)
    }
}

fn params_ref(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl QueryExecutor for tokio_postgres::Client {
    type Row = Row;

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> QueryResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, &params_ref(params))
            .await
            .map_err(QueryError::from)
    }
}

impl QueryExecutor for tokio_postgres::Transaction<'_> {
    type Row = Row;

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> QueryResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, &params_ref(params))
            .await
            .map_err(QueryError::from)
    }
}

#[cfg(feature = "pool")]
impl QueryExecutor for deadpool_postgres::Client {
    type Row = Row;

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> QueryResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, &params_ref(params))
            .await
            .map_err(QueryError::from)
    }
}

/// Checks out one connection per call.
#[cfg(feature = "pool")]
impl QueryExecutor for deadpool_postgres::Pool {
    type Row = Row;

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> QueryResult<Vec<Row>> {
        let client = self.get().await?;
        tokio_postgres::Client::query(&client, sql, &params_ref(params))
            .await
            .map_err(QueryError::from)
    }
}
