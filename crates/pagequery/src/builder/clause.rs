//! Pure per-clause renderers.
//!
//! Each function renders one clause. Functions that bind values take the
//! shared [`Placeholders`] accumulator, which hands out the next placeholder
//! and records the value in the same step, so text and parameters cannot
//! drift apart.

use crate::config::{BuilderConfig, PlaceholderStyle};
use crate::query_spec::{Join, QuerySpec, Sort};
use crate::types::{FilterValue, Filters, Value};

/// Parameter accumulator shared by the clause renderers.
#[derive(Debug, Clone)]
pub struct Placeholders {
    style: PlaceholderStyle,
    params: Vec<Value>,
}

impl Placeholders {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            params: Vec::new(),
        }
    }

    /// Record `value` and return the placeholder that binds it.
    pub fn push(&mut self, value: Value) -> String {
        self.params.push(value);
        match self.style {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${}", self.params.len()),
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// `SELECT <columns> FROM <table>`.
pub fn select_clause(columns: &[String], table: &str) -> String {
    let columns = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    };
    format!("SELECT {} FROM {}", columns, table)
}

/// One `<type> <table> ON <on>` per join, in input order.
pub fn join_clauses(joins: &[Join], default_join_type: &str) -> Vec<String> {
    joins
        .iter()
        .map(|join| {
            let join_type = join
                .join_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(default_join_type);
            format!("{} {} ON {}", join_type, join.table, join.on)
        })
        .collect()
}

/// Predicate for one filter, or `None` when the filter contributes nothing.
pub fn filter_predicate(
    column: &str,
    value: &FilterValue,
    placeholders: &mut Placeholders,
) -> Option<String> {
    match value {
        FilterValue::Range {
            start: Some(start),
            end: Some(end),
        } => {
            let p1 = placeholders.push(start.clone());
            let p2 = placeholders.push(end.clone());
            Some(format!("{} BETWEEN {} AND {}", column, p1, p2))
        }
        FilterValue::Range {
            start: Some(start),
            end: None,
        } => {
            let p = placeholders.push(start.clone());
            Some(format!("{} >= {}", column, p))
        }
        FilterValue::Range {
            start: None,
            end: Some(end),
        } => {
            let p = placeholders.push(end.clone());
            Some(format!("{} <= {}", column, p))
        }
        FilterValue::Range {
            start: None,
            end: None,
        } => None,
        // `IN ()` is not valid SQL; an empty list matches nothing.
        FilterValue::List(values) if values.is_empty() => Some("1=0".to_string()),
        FilterValue::List(values) => {
            let list: Vec<String> = values
                .iter()
                .map(|v| placeholders.push(v.clone()))
                .collect();
            Some(format!("{} IN ({})", column, list.join(", ")))
        }
        FilterValue::Scalar(v) => {
            let p = placeholders.push(v.clone());
            Some(format!("{} = {}", column, p))
        }
        FilterValue::Absent => None,
    }
}

/// `WHERE <default> AND <filter predicates...>`, or `None` when nothing applies.
pub fn where_clause(
    default_where: Option<&str>,
    filters: &Filters,
    placeholders: &mut Placeholders,
) -> Option<String> {
    let mut predicates: Vec<String> = default_where
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .into_iter()
        .collect();

    for (column, value) in filters.iter() {
        if let Some(predicate) = filter_predicate(column, value, placeholders) {
            predicates.push(predicate);
        }
    }

    if predicates.is_empty() {
        None
    } else {
        Some(format!("WHERE {}", predicates.join(" AND ")))
    }
}

/// `GROUP BY <cols>`.
pub fn group_by_clause(columns: &[String]) -> Option<String> {
    if columns.is_empty() {
        return None;
    }
    Some(format!("GROUP BY {}", columns.join(", ")))
}

/// `ORDER BY <col DIR, ...>`.
pub fn order_by_clause(sort: &[Sort]) -> Option<String> {
    if sort.is_empty() {
        return None;
    }
    let items: Vec<String> = sort
        .iter()
        .map(|s| format!("{} {}", s.column, s.direction))
        .collect();
    Some(format!("ORDER BY {}", items.join(", ")))
}

/// `LIMIT ? OFFSET ?`, binding limit then offset.
pub fn limit_offset_clause(pagination: Pagination, placeholders: &mut Placeholders) -> String {
    let limit = placeholders.push(Value::Int(pagination.limit));
    let offset = placeholders.push(Value::Int(pagination.offset()));
    format!("LIMIT {} OFFSET {}", limit, offset)
}

/// Resolved page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Apply config defaults, clamp `page` and `limit` to >= 1 and `limit`
    /// to the configured maximum.
    pub fn resolve(spec: &QuerySpec, config: &BuilderConfig) -> Self {
        let page = spec.page.unwrap_or(config.default_page).max(1);
        let mut limit = spec.limit.unwrap_or(config.default_limit).max(1);
        if let Some(max) = config.max_limit {
            limit = limit.min(max.max(1));
        }
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
