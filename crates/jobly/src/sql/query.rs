use super::value::SqlValue;
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A SQL string with pre-numbered placeholders (`$1, $2, ...`) plus bound parameters.
///
/// The compilers hand back pre-numbered fragments, so the repositories splice
/// them into a statement and bind the values here in placeholder order.
#[must_use]
pub struct Query {
    sql: String,
    params: Vec<Arc<dyn ToSql + Sync + Send>>,
}

impl Query {
    /// Create a new pre-numbered query.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind a parameter value.
    ///
    /// This does not modify the SQL string; it only appends the value to the
    /// parameter list. The SQL string must already contain `$1, $2, ...`.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    /// Bind compiled values in order, continuing the current numbering.
    pub fn bind_values(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        for value in values {
            self.params.push(Arc::new(value));
        }
        self
    }

    /// Access the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    /// Execute the query and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        let params = self.params_ref();
        conn.query(&self.sql, &params).await
    }

    /// Execute the query and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the query and return the **first** row.
    ///
    /// Zero rows is [`JoblyError::NotFound`](crate::JoblyError::NotFound).
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        let params = self.params_ref();
        conn.query_one(&self.sql, &params).await
    }

    /// Execute the query and return the **first** row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the query and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        let params = self.params_ref();
        conn.query_opt(&self.sql, &params).await
    }

    /// Execute the query and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the query and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let params = self.params_ref();
        conn.execute(&self.sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_values_continue_numbering() {
        let q = Query::new("UPDATE jobs SET \"title\"=$1, \"salary\"=$2 WHERE id = $3")
            .bind_values(vec![SqlValue::from("x"), SqlValue::Int(10)])
            .bind(7_i32);
        assert_eq!(q.param_count(), 3);
        assert_eq!(q.params_ref().len(), 3);
    }
}
