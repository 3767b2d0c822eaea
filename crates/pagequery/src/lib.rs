//! # pagequery
//!
//! A parameter-safe builder for paged SELECT statements.
//!
//! ## Features
//!
//! - **Declarative**: describe table, joins, filters, grouping, sorting,
//!   projection and pagination in a [`QuerySpec`]
//! - **Injection-safe**: every filter value becomes a bound parameter
//! - **Typed filters**: range → `BETWEEN`, list → `IN`, scalar → `=`, absent → skipped
//! - **Fixed clause order**: `SELECT .. FROM .. JOIN .. WHERE .. GROUP BY .. ORDER BY .. LIMIT .. OFFSET ..`
//! - **Executor-agnostic**: runs through any [`QueryExecutor`]; tokio-postgres
//!   and deadpool-postgres are supported out of the box
//!
//! ## Example
//!
//! ```ignore
//! use pagequery::{FilterValue, QueryBuilder, QuerySpec, Sort};
//!
//! let spec = QuerySpec::new("orders")
//!     .filter("status", "paid")
//!     .filter("amount", FilterValue::range(10, 100))
//!     .sort(Sort::desc("created_at"))
//!     .page(2)
//!     .limit(5);
//!
//! // Pure compile:
//! let compiled = pagequery::compile(&spec)?;
//! assert_eq!(
//!     compiled.sql(),
//!     "SELECT * FROM orders WHERE status = ? AND amount BETWEEN ? AND ? \
//!      ORDER BY created_at DESC LIMIT ? OFFSET ?"
//! );
//!
//! // Or run it (placeholders follow the executor, `$n` for PostgreSQL):
//! let rows = QueryBuilder::new().fetch(&client, &spec).await?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod query_spec;
pub mod types;

pub use builder::{CompiledQuery, Page, Pagination, QueryBuilder, compile};
pub use config::{BuilderConfig, PlaceholderStyle};
pub use error::{BoxError, QueryError, QueryResult};
pub use executor::{CountRow, QueryExecutor};
pub use query_spec::{Join, QuerySpec, Sort, SortDirection};
pub use types::{FilterValue, Filters, Value};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
