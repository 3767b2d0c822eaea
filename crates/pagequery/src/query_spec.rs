//! Declarative description of a paged SELECT.

use crate::error::QueryError;
use crate::types::{FilterValue, Filters};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// One JOIN clause: `<join_type> <table> ON <on>`.
///
/// `table` and `on` are structural SQL text and are not escaped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Join {
    /// `None` uses the builder's default (`LEFT JOIN`).
    #[serde(default, alias = "joinType")]
    pub join_type: Option<String>,
    pub table: String,
    #[serde(alias = "onCondition")]
    pub on: String,
}

impl Join {
    pub fn new(join_type: impl Into<String>, table: impl Into<String>, on: impl Into<String>) -> Self {
        Self {
            join_type: Some(join_type.into()),
            table: table.into(),
            on: on.into(),
        }
    }

    /// Join using the builder's default join type.
    pub fn default_type(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self {
            join_type: None,
            table: table.into(),
            on: on.into(),
        }
    }
}

/// Sort direction, rendered as `ASC` / `DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(QueryError::validation(format!(
                "invalid sort direction '{other}' (expected ASC or DESC)"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sort {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Everything needed to compile one paged SELECT.
///
/// Built fluently or deserialized from JSON (snake_case keys, camelCase
/// aliases accepted). Unset `columns`, `page` and `limit` fall back to the
/// builder's [`BuilderConfig`](crate::BuilderConfig).
///
/// ```ignore
/// let spec = QuerySpec::new("orders")
///     .filter("status", "paid")
///     .filter("amount", FilterValue::range(10, 100))
///     .sort(Sort::desc("created_at"))
///     .page(2)
///     .limit(5);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    #[serde(alias = "tableName")]
    pub table_name: String,
    /// Raw predicate ANDed with the filter predicates. Not parameterized.
    #[serde(alias = "defaultWhereConditions")]
    pub default_where: Option<String>,
    pub joins: Vec<Join>,
    pub filters: Filters,
    pub sort: Vec<Sort>,
    #[serde(alias = "groupBy")]
    pub group_by: Vec<String>,
    pub columns: Vec<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(alias = "countMode")]
    pub count_mode: bool,
}

impl QuerySpec {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Parse a spec from JSON text.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        serde_json::from_str(json).map_err(|e| QueryError::validation(e.to_string()))
    }

    pub fn default_where(mut self, predicate: impl Into<String>) -> Self {
        self.default_where = Some(predicate.into());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn left_join(self, table: impl Into<String>, on: impl Into<String>) -> Self {
        self.join(Join::new("LEFT JOIN", table, on))
    }

    pub fn inner_join(self, table: impl Into<String>, on: impl Into<String>) -> Self {
        self.join(Join::new("INNER JOIN", table, on))
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(column, value);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn count_mode(mut self, count_mode: bool) -> Self {
        self.count_mode = count_mode;
        self
    }

    /// Total-row-count variant of this spec.
    ///
    /// Selects `COUNT(*)`, turns count mode on and drops ORDER BY. With
    /// GROUP BY present the result has one row per group.
    pub fn for_count(&self) -> Self {
        Self {
            columns: vec!["COUNT(*)".to_string()],
            sort: Vec::new(),
            count_mode: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn sort_direction_is_case_insensitive() {
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!(" Asc ".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("sideways".parse::<SortDirection>().unwrap_err().is_validation());
    }

    #[test]
    fn deserialize_camel_case_spec() {
        let spec = QuerySpec::from_json(
            r#"{
                "tableName": "orders",
                "defaultWhereConditions": "deleted_at IS NULL",
                "joins": [{"table": "users u", "onCondition": "u.id = orders.user_id"}],
                "filters": {"status": "paid", "amount": {"start": 10, "end": 100}, "note": null},
                "sort": [{"column": "created_at", "direction": "desc"}],
                "groupBy": ["status"],
                "page": 2,
                "limit": 5,
                "countMode": false
            }"#,
        )
        .unwrap();

        assert_eq!(spec.table_name, "orders");
        assert_eq!(spec.default_where.as_deref(), Some("deleted_at IS NULL"));
        assert_eq!(spec.joins[0].join_type, None);
        assert_eq!(spec.joins[0].on, "u.id = orders.user_id");
        assert_eq!(spec.filters.len(), 3);
        assert_eq!(
            spec.filters.get("status"),
            Some(&FilterValue::Scalar(Value::Text("paid".into())))
        );
        assert_eq!(spec.filters.get("note"), Some(&FilterValue::Absent));
        assert_eq!(spec.sort, vec![Sort::desc("created_at")]);
        assert_eq!(spec.group_by, vec!["status".to_string()]);
        assert_eq!(spec.page, Some(2));
        assert_eq!(spec.limit, Some(5));
        assert!(spec.columns.is_empty());
    }

    #[test]
    fn deserialize_rejects_bad_direction() {
        let err = QuerySpec::from_json(
            r#"{"table_name": "t", "sort": [{"column": "a", "direction": "up"}]}"#,
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn count_variant_drops_sort_and_projection() {
        let spec = QuerySpec::new("orders")
            .columns(["id", "status"])
            .filter("status", "paid")
            .sort(Sort::desc("created_at"))
            .page(3);
        let count = spec.for_count();
        assert!(count.count_mode);
        assert!(count.sort.is_empty());
        assert_eq!(count.columns, vec!["COUNT(*)".to_string()]);
        assert_eq!(count.filters, spec.filters);
    }
}
