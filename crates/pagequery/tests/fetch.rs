use pagequery::{
    BuilderConfig, CountRow, FilterValue, PlaceholderStyle, QueryBuilder, QueryError, QueryExecutor,
    QueryResult, QuerySpec, Sort, Value,
};
use std::error::Error as _;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
struct FakeRow(i64);

impl CountRow for FakeRow {
    fn count(&self) -> QueryResult<i64> {
        Ok(self.0)
    }
}

/// Records every call and replays queued responses in order.
struct RecordingExecutor {
    style: PlaceholderStyle,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    responses: Mutex<Vec<QueryResult<Vec<FakeRow>>>>,
}

impl RecordingExecutor {
    fn new(style: PlaceholderStyle, responses: Vec<QueryResult<Vec<FakeRow>>>) -> Self {
        Self {
            style,
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into_iter().rev().collect()),
        }
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl QueryExecutor for RecordingExecutor {
    type Row = FakeRow;

    fn placeholder_style(&self) -> PlaceholderStyle {
        self.style
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> QueryResult<Vec<FakeRow>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn orders_spec() -> QuerySpec {
    QuerySpec::new("orders")
        .filter("status", "paid")
        .filter("amount", FilterValue::range(10, 100))
        .sort(Sort::desc("created_at"))
        .page(2)
        .limit(5)
}

#[tokio::test]
async fn fetch_delegates_once_with_compiled_query() {
    let executor = RecordingExecutor::new(
        PlaceholderStyle::Question,
        vec![Ok(vec![FakeRow(1), FakeRow(2)])],
    );

    let rows = QueryBuilder::new()
        .fetch(&executor, &orders_spec())
        .await
        .unwrap();
    assert_eq!(rows, vec![FakeRow(1), FakeRow(2)]);

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        "SELECT * FROM orders WHERE status = ? AND amount BETWEEN ? AND ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
    );
    assert_eq!(
        calls[0].1,
        vec![
            Value::Text("paid".into()),
            Value::Int(10),
            Value::Int(100),
            Value::Int(5),
            Value::Int(5),
        ]
    );
}

#[tokio::test]
async fn fetch_uses_executor_placeholder_style() {
    let executor = RecordingExecutor::new(PlaceholderStyle::Dollar, Vec::new());
    // Config says `?`, but the executor wants `$n`.
    let builder = QueryBuilder::with_config(BuilderConfig::new());

    builder.fetch(&executor, &orders_spec()).await.unwrap();

    assert_eq!(
        executor.calls()[0].0,
        "SELECT * FROM orders WHERE status = $1 AND amount BETWEEN $2 AND $3 ORDER BY created_at DESC LIMIT $4 OFFSET $5"
    );
}

#[tokio::test]
async fn validation_error_never_reaches_executor() {
    let executor = RecordingExecutor::new(PlaceholderStyle::Question, Vec::new());

    let err = QueryBuilder::new()
        .fetch(&executor, &QuerySpec::new(""))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn execution_error_propagates_unchanged() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    let executor = RecordingExecutor::new(
        PlaceholderStyle::Question,
        vec![Err(QueryError::execution(io)), Ok(vec![FakeRow(9)])],
    );

    let err = QueryBuilder::new()
        .fetch(&executor, &orders_spec())
        .await
        .unwrap_err();

    assert!(err.is_execution());
    let io = err
        .source()
        .and_then(|s| s.downcast_ref::<std::io::Error>())
        .expect("io error source");
    assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    // No retry.
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn fetch_count_reads_single_value() {
    let executor = RecordingExecutor::new(PlaceholderStyle::Question, vec![Ok(vec![FakeRow(42)])]);

    let total = QueryBuilder::new()
        .fetch_count(&executor, &orders_spec())
        .await
        .unwrap();
    assert_eq!(total, 42);

    let calls = executor.calls();
    assert_eq!(
        calls[0].0,
        "SELECT COUNT(*) FROM orders WHERE status = ? AND amount BETWEEN ? AND ?"
    );
    assert_eq!(calls[0].1.len(), 3);
}

#[tokio::test]
async fn fetch_count_with_group_by_counts_groups() {
    let executor = RecordingExecutor::new(
        PlaceholderStyle::Question,
        vec![Ok(vec![FakeRow(3), FakeRow(5), FakeRow(1)])],
    );
    let spec = QuerySpec::new("orders").group_by("user_id");

    let total = QueryBuilder::new().fetch_count(&executor, &spec).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(
        executor.calls()[0].0,
        "SELECT COUNT(*) FROM orders GROUP BY user_id"
    );
}

#[tokio::test]
async fn fetch_page_combines_rows_and_total() {
    let executor = RecordingExecutor::new(
        PlaceholderStyle::Question,
        vec![
            Ok(vec![FakeRow(6), FakeRow(7), FakeRow(8), FakeRow(9), FakeRow(10)]),
            Ok(vec![FakeRow(12)]),
        ],
    );

    let page = QueryBuilder::new()
        .fetch_page(&executor, &orders_spec().count_mode(true))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 12);
    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 5);
    assert_eq!(page.total_pages(), 3);
    assert!(page.has_next());

    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.ends_with("LIMIT ? OFFSET ?"));
    assert!(calls[1].0.starts_with("SELECT COUNT(*) FROM orders"));
}

#[tokio::test]
async fn concurrent_fetches_are_independent() {
    let builder = QueryBuilder::new();
    let executor = RecordingExecutor::new(PlaceholderStyle::Question, Vec::new());

    let a = QuerySpec::new("users").filter("id", 1);
    let b = QuerySpec::new("teams").filter("id", FilterValue::list([2, 3]));
    let (ra, rb) = tokio::join!(builder.fetch(&executor, &a), builder.fetch(&executor, &b));
    ra.unwrap();
    rb.unwrap();

    let mut sqls: Vec<String> = executor.calls().into_iter().map(|(sql, _)| sql).collect();
    sqls.sort();
    assert_eq!(
        sqls,
        vec![
            "SELECT * FROM teams WHERE id IN (?, ?) LIMIT ? OFFSET ?".to_string(),
            "SELECT * FROM users WHERE id = ? LIMIT ? OFFSET ?".to_string(),
        ]
    );
}
