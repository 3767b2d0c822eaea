//! Filter values and the ordered filter map.

use super::value::Value;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// The shape of one filter, resolved once when the filter is constructed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterValue {
    /// `col BETWEEN start AND end`; a single bound becomes `>=` / `<=`.
    Range {
        start: Option<Value>,
        end: Option<Value>,
    },
    /// `col IN (...)`.
    List(Vec<Value>),
    /// `col = value`.
    Scalar(Value),
    /// No predicate.
    #[default]
    Absent,
}

impl FilterValue {
    /// Closed range with both bounds.
    pub fn range(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        FilterValue::Range {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Range with only a lower bound.
    pub fn at_least(start: impl Into<Value>) -> Self {
        FilterValue::Range {
            start: Some(start.into()),
            end: None,
        }
    }

    /// Range with only an upper bound.
    pub fn at_most(end: impl Into<Value>) -> Self {
        FilterValue::Range {
            start: None,
            end: Some(end.into()),
        }
    }

    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn scalar(value: impl Into<Value>) -> Self {
        FilterValue::Scalar(value.into())
    }

    /// Optional scalar: `None` becomes [`FilterValue::Absent`].
    pub fn opt(value: Option<impl Into<Value>>) -> Self {
        value.map_or(FilterValue::Absent, FilterValue::scalar)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FilterValue::Absent)
    }

    /// Resolve a JSON value into a filter shape.
    ///
    /// - `null` -> `Absent`
    /// - object with `start` and/or `end` -> `Range` (null bounds count as missing)
    /// - array of scalars -> `List` (null elements are dropped)
    /// - any other scalar -> `Scalar`
    pub fn from_json(value: serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::Null => Ok(FilterValue::Absent),
            serde_json::Value::Object(mut obj) => {
                if let Some(key) = obj.keys().find(|k| *k != "start" && *k != "end") {
                    return Err(format!(
                        "unexpected key '{key}' in range filter (expected 'start'/'end')"
                    ));
                }
                let start = obj.remove("start").map(range_bound).transpose()?.flatten();
                let end = obj.remove("end").map(range_bound).transpose()?.flatten();
                Ok(FilterValue::Range { start, end })
            }
            serde_json::Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_null() {
                        continue;
                    }
                    let v = Value::from_json(&item)
                        .ok_or_else(|| format!("list filter elements must be scalars, got {item}"))?;
                    values.push(v);
                }
                Ok(FilterValue::List(values))
            }
            scalar => Value::from_json(&scalar)
                .map(FilterValue::Scalar)
                .ok_or_else(|| format!("unsupported filter value {scalar}")),
        }
    }
}

fn range_bound(value: serde_json::Value) -> Result<Option<Value>, String> {
    if value.is_null() {
        return Ok(None);
    }
    Value::from_json(&value)
        .map(Some)
        .ok_or_else(|| format!("range bounds must be scalars, got {value}"))
}

impl<T: Into<Value>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        FilterValue::opt(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::list(values)
    }
}

impl<T: Into<Value>> From<std::ops::RangeInclusive<T>> for FilterValue {
    fn from(range: std::ops::RangeInclusive<T>) -> Self {
        let (start, end) = range.into_inner();
        FilterValue::range(start, end)
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(v: $ty) -> Self {
                    FilterValue::Scalar(v.into())
                }
            }
        )*
    };
}

impl_scalar_from!(bool, i16, i32, i64, u8, u16, u32, f32, f64, &str, String, uuid::Uuid, Value);

impl From<chrono::DateTime<chrono::Utc>> for FilterValue {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        FilterValue::Scalar(v.into())
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        FilterValue::from_json(raw).map_err(de::Error::custom)
    }
}

/// Filters keyed by column, kept in insertion order.
///
/// Insertion order decides predicate order in the WHERE clause. Setting a
/// column twice replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filters {
    entries: Vec<(String, FilterValue)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FilterValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (k, v) in iter {
            filters.insert(k, v);
        }
        filters
    }
}

impl<'de> Deserialize<'de> for Filters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FiltersVisitor;

        impl<'de> Visitor<'de> for FiltersVisitor {
            type Value = Filters;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to filter values")
            }

            // Visit in document order; a BTreeMap would sort the columns.
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Filters, A::Error> {
                let mut filters = Filters::new();
                while let Some((column, value)) = map.next_entry::<String, FilterValue>()? {
                    filters.insert(column, value);
                }
                Ok(filters)
            }
        }

        deserializer.deserialize_map(FiltersVisitor)
    }
}
