//! Paged SELECT builder.
//!
//! Compiles a [`QuerySpec`] into SQL text plus bound parameters, then
//! optionally hands the result to a [`QueryExecutor`].
//!
//! ## Design
//!
//! - Clause order is fixed: `SELECT .. FROM .. [JOIN ..]* [WHERE ..]
//!   [GROUP BY ..] [ORDER BY ..] [LIMIT ? OFFSET ?]`.
//! - Every filter value is a bound parameter. Table, join, column, sort and
//!   `default_where` text is structural and trusted.
//! - Each clause is rendered by a pure function in [`clause`].

pub mod clause;
mod compiled;

pub use clause::{Pagination, Placeholders};
pub use compiled::CompiledQuery;

use crate::config::{BuilderConfig, PlaceholderStyle};
use crate::error::{QueryError, QueryResult};
use crate::executor::{CountRow, QueryExecutor};
use crate::query_spec::QuerySpec;

/// Log target for SQL events.
const SQL_TARGET: &str = "pagequery.sql";

/// Stateless SELECT compiler. Holds only read-only configuration.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: BuilderConfig,
}

impl QueryBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Compile `spec` using the configured placeholder style.
    ///
    /// Fails with [`QueryError::Validation`] when the table name is empty.
    pub fn build(&self, spec: &QuerySpec) -> QueryResult<CompiledQuery> {
        self.build_with_style(spec, self.config.placeholder)
    }

    /// Compile the total-row-count variant of `spec` (see [`QuerySpec::for_count`]).
    pub fn build_count(&self, spec: &QuerySpec) -> QueryResult<CompiledQuery> {
        self.build(&spec.for_count())
    }

    fn build_with_style(
        &self,
        spec: &QuerySpec,
        style: PlaceholderStyle,
    ) -> QueryResult<CompiledQuery> {
        let table = spec.table_name.trim();
        if table.is_empty() {
            return Err(QueryError::validation("table name required"));
        }

        let columns = if spec.columns.is_empty() {
            &self.config.default_columns
        } else {
            &spec.columns
        };

        let mut placeholders = Placeholders::new(style);
        let mut parts = vec![clause::select_clause(columns, table)];

        parts.extend(clause::join_clauses(
            &spec.joins,
            &self.config.default_join_type,
        ));

        if let Some(where_sql) = clause::where_clause(
            spec.default_where.as_deref(),
            &spec.filters,
            &mut placeholders,
        ) {
            parts.push(where_sql);
        }

        if let Some(group) = clause::group_by_clause(&spec.group_by) {
            parts.push(group);
        }

        if let Some(order) = clause::order_by_clause(&spec.sort) {
            parts.push(order);
        }

        if !spec.count_mode {
            let pagination = Pagination::resolve(spec, &self.config);
            parts.push(clause::limit_offset_clause(pagination, &mut placeholders));
        }

        Ok(CompiledQuery::new(parts.join(" "), placeholders.into_params()))
    }

    /// Compile `spec` for `executor` and return all rows of the requested page.
    ///
    /// The executor runs exactly once. Its failure is logged together with
    /// the failing SQL and returned unchanged.
    pub async fn fetch<E: QueryExecutor>(
        &self,
        executor: &E,
        spec: &QuerySpec,
    ) -> QueryResult<Vec<E::Row>> {
        let compiled = self.build_with_style(spec, executor.placeholder_style())?;
        self.run(executor, &compiled, spec.count_mode).await
    }

    /// Count the rows matching `spec`, ignoring pagination.
    ///
    /// Without GROUP BY this reads the single `COUNT(*)` value; with GROUP BY
    /// it returns the number of groups.
    pub async fn fetch_count<E>(&self, executor: &E, spec: &QuerySpec) -> QueryResult<i64>
    where
        E: QueryExecutor,
        E::Row: CountRow,
    {
        let count_spec = spec.for_count();
        let compiled = self.build_with_style(&count_spec, executor.placeholder_style())?;
        let rows = self.run(executor, &compiled, true).await?;

        if !count_spec.group_by.is_empty() {
            return Ok(rows.len() as i64);
        }
        match rows.first() {
            Some(row) => row.count(),
            None => Ok(0),
        }
    }

    /// Fetch one page of rows together with the total match count.
    pub async fn fetch_page<E>(&self, executor: &E, spec: &QuerySpec) -> QueryResult<Page<E::Row>>
    where
        E: QueryExecutor,
        E::Row: CountRow,
    {
        let pagination = Pagination::resolve(spec, &self.config);
        let page_spec = QuerySpec {
            count_mode: false,
            ..spec.clone()
        };
        let items = self.fetch(executor, &page_spec).await?;
        let total = self.fetch_count(executor, spec).await?;
        Ok(Page {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    async fn run<E: QueryExecutor>(
        &self,
        executor: &E,
        compiled: &CompiledQuery,
        count_mode: bool,
    ) -> QueryResult<Vec<E::Row>> {
        tracing::debug!(
            target: SQL_TARGET,
            param_count = compiled.params().len(),
            count_mode,
            sql = %self.truncate_sql(compiled.sql()),
            "executing query"
        );

        match executor.execute(compiled.sql(), compiled.params()).await {
            Ok(rows) => {
                tracing::trace!(target: SQL_TARGET, rows = rows.len(), "query finished");
                Ok(rows)
            }
            Err(err) => {
                tracing::error!(
                    target: SQL_TARGET,
                    error = %err,
                    sql = %self.truncate_sql(compiled.sql()),
                    "query failed"
                );
                Err(err)
            }
        }
    }

    fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.config.max_logged_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_sql_bytes(sql, max)).into()
            }
            _ => sql.into(),
        }
    }
}

/// Truncate on a char boundary at or below `max_bytes`.
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

/// One page of rows plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total rows matching the filters, across all pages.
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    /// Zero when there are no rows or `limit` is not positive.
    pub fn total_pages(&self) -> i64 {
        if self.total <= 0 || self.limit <= 0 {
            return 0;
        }
        self.total / self.limit + i64::from(self.total % self.limit != 0)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Compile `spec` with the default configuration (`?` placeholders).
pub fn compile(spec: &QuerySpec) -> QueryResult<CompiledQuery> {
    QueryBuilder::new().build(spec)
}
