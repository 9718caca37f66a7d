//! Statement logging via `tracing`.
//!
//! [`TracingClient`] wraps any [`GenericClient`] and emits one event per
//! statement on target `jobly.sql` before it runs. Only the SQL text and the
//! parameter count are recorded; bound values never reach the log.
//!
//! ```ignore
//! let tx = client.transaction().await?;
//! let conn = TracingClient::new(&tx).max_sql_length(120);
//! let jobs = Job::find_all(&conn, &filters).await?;
//! ```

use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::sql::{starts_with_keyword, strip_sql_prefix};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// The kind of statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryType {
    /// Detect the statement kind from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A [`GenericClient`] that logs each statement before delegating.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    inner: C,
    level: Level,
    max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap `inner`, logging at `DEBUG` and truncating SQL to 200 bytes.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn display_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn emit(&self, sql: &str, param_count: usize) {
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let shown = self.display_sql(sql);
        emit_at_level!(
            self.level,
            target: "jobly.sql",
            query_type = ?QueryType::from_sql(sql),
            param_count,
            sql = %shown,
        );
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.emit(sql, params.len());
        self.inner.query(sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Row> {
        self.emit(sql, params.len());
        self.inner.query_one(sql, params).await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Option<Row>> {
        self.emit(sql, params.len());
        self.inner.query_opt(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.emit(sql, params.len());
        self.inner.execute(sql, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_statement_kind() {
        assert_eq!(QueryType::from_sql("SELECT id FROM jobs"), QueryType::Select);
        assert_eq!(
            QueryType::from_sql("  insert into jobs (title) VALUES ($1)"),
            QueryType::Insert
        );
        assert_eq!(
            QueryType::from_sql("/* patch */ UPDATE jobs SET \"title\"=$1 WHERE id = $2"),
            QueryType::Update
        );
        assert_eq!(QueryType::from_sql("DELETE FROM jobs WHERE id = $1"), QueryType::Delete);
        assert_eq!(QueryType::from_sql("CREATE TABLE t ()"), QueryType::Other);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting inside it backs off to the boundary.
        assert_eq!(truncate_sql_bytes("é", 1), "");
    }
}
