//! Builder configuration.

use serde::Deserialize;

/// How placeholders are spelled in the generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?` for every parameter.
    #[default]
    Question,
    /// `$1`, `$2`, ... (PostgreSQL).
    Dollar,
}

/// Defaults applied when a [`QuerySpec`](crate::QuerySpec) leaves a field unset.
///
/// Deserializable with every field optional, so it can sit inside an
/// application config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Projection used when a spec selects no columns.
    pub default_columns: Vec<String>,
    pub default_page: i64,
    pub default_limit: i64,
    /// Upper clamp on `limit`. `None` means unbounded.
    pub max_limit: Option<i64>,
    pub default_join_type: String,
    pub placeholder: PlaceholderStyle,
    /// Truncate SQL in log events (in bytes). `None` logs the full text.
    pub max_logged_sql_length: Option<usize>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_columns: vec!["*".to_string()],
            default_page: 1,
            default_limit: 10,
            max_limit: None,
            default_join_type: "LEFT JOIN".to_string(),
            placeholder: PlaceholderStyle::Question,
            max_logged_sql_length: Some(200),
        }
    }
}

impl BuilderConfig {
    /// Create a configuration with defaults (`*`, page 1, limit 10, `LEFT JOIN`, `?`).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_page(mut self, page: i64) -> Self {
        self.default_page = page;
        self
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Clamp every page size to at most `max`.
    pub fn with_max_limit(mut self, max: i64) -> Self {
        self.max_limit = Some(max);
        self
    }

    pub fn with_default_join_type(mut self, join_type: impl Into<String>) -> Self {
        self.default_join_type = join_type.into();
        self
    }

    pub fn with_placeholder(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder = style;
        self
    }

    pub fn with_max_logged_sql_length(mut self, len: usize) -> Self {
        self.max_logged_sql_length = Some(len);
        self
    }

    /// Log SQL without truncation.
    pub fn no_log_truncate(mut self) -> Self {
        self.max_logged_sql_length = None;
        self
    }
}
