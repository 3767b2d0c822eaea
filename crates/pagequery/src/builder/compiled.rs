use crate::types::Value;
use tokio_postgres::types::ToSql;

/// SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    sql: String,
    params: Vec<Value>,
}

impl CompiledQuery {
    pub(crate) fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Parameters as references compatible with tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }

    /// Number of placeholders in the SQL text (`?` or `$n`).
    pub fn placeholder_count(&self) -> usize {
        let bytes = self.sql.as_bytes();
        let mut count = 0;
        for (i, b) in bytes.iter().enumerate() {
            match b {
                b'?' => count += 1,
                b'$' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => count += 1,
                _ => {}
            }
        }
        count
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl std::fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}
