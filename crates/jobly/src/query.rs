//! Lightweight query builder for hand-written SQL

use crate::clause::ClauseFragment;
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Executes hand-written SQL whose `$1, $2, ...` placeholders are filled in
/// bind order.
///
/// # Example
///
/// ```ignore
/// use jobly::query;
///
/// let job: Job = query("SELECT * FROM jobs WHERE id = $1")
///     .bind(job_id)
///     .fetch_one_as(&conn)
///     .await?;
/// ```
pub struct Query {
    sql: String,
    params: Vec<Box<dyn ToSql + Sync + Send>>,
}

/// Create a new query with the given SQL
pub fn query(sql: impl Into<String>) -> Query {
    Query {
        sql: sql.into(),
        params: Vec::new(),
    }
}

impl Query {
    /// Bind a parameter to the query
    pub fn bind<T: ToSql + Sync + Send + 'static>(mut self, value: T) -> Self {
        self.params.push(Box::new(value));
        self
    }

    /// Bind every value of a clause fragment, in order.
    ///
    /// The fragment's placeholders must already be numbered to follow the
    /// parameters bound so far.
    pub fn bind_fragment(mut self, fragment: &ClauseFragment) -> Self {
        for value in &fragment.values {
            self.params.push(Box::new(value.clone()));
        }
        self
    }

    /// The SQL text as it will be sent.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref() as _).collect()
    }

    fn trace(&self) {
        tracing::debug!(
            target: "jobly.sql",
            sql = %self.sql,
            params = self.params.len(),
            "executing query"
        );
    }

    /// Execute the query and return all rows
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        self.trace();
        conn.query(&self.sql, &self.params_ref()).await
    }

    /// Execute the query and return all rows mapped to type T
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the query and return exactly one row
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        self.trace();
        conn.query_one(&self.sql, &self.params_ref()).await
    }

    /// Execute the query and return exactly one row mapped to type T
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the query and return at most one row
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        self.trace();
        conn.query_opt(&self.sql, &self.params_ref()).await
    }

    /// Execute the query and return at most one row mapped to type T
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the statement and return the number of affected rows
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        self.trace();
        conn.execute(&self.sql, &self.params_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    #[test]
    fn fragment_values_follow_earlier_binds() {
        let frag = ClauseFragment::new("salary >= $2", vec![SqlValue::Int(5)]);
        let q = query("SELECT * FROM jobs WHERE company_handle = $1 AND salary >= $2")
            .bind("c1")
            .bind_fragment(&frag);
        assert_eq!(q.param_count(), 2);
        assert_eq!(q.params_ref().len(), 2);
    }
}
