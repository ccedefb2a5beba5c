//! Parameter-tracking SQL builder.
//!
//! [`QueryBuilder`] owns both the statement text and the list of bound
//! values. A placeholder is produced only by binding a value, and its number
//! is the length of the list at that moment, so fragments can be composed in
//! any order without shifting indices after the fact.

use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use vt_core::{Error, Result};

/// An SQL statement under construction plus its bound parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    sql: String,
    params: Vec<Value>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw SQL text.
    pub fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    /// Bind a value and return its `?N` placeholder without appending it.
    ///
    /// Useful when the same value is referenced more than once, or when the
    /// placeholder is embedded in a larger expression.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    /// Bind a value and append its placeholder.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        let placeholder = self.bind(value);
        self.sql.push_str(&placeholder);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Run the statement and map every row.
    pub fn query_all<T, F>(&self, conn: &Connection, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = conn
            .prepare(&self.sql)
            .map_err(|e| Error::database(e.to_string()))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(self.params.iter()), map)
            .map_err(|e| Error::database(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::database(e.to_string()))?;
        Ok(rows)
    }

    /// Run a statement expected to return exactly one row.
    pub fn query_one<T, F>(&self, conn: &Connection, map: F) -> Result<T>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        conn.query_row(
            &self.sql,
            rusqlite::params_from_iter(self.params.iter()),
            map,
        )
        .map_err(|e| Error::database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_bind_order() {
        let mut qb = QueryBuilder::new();
        qb.push("SELECT ").push_bind(1i64).push(" + ").push_bind(2i64);
        assert_eq!(qb.sql(), "SELECT ?1 + ?2");
        assert_eq!(qb.params().len(), 2);
    }

    #[test]
    fn bound_value_can_be_reused() {
        let mut qb = QueryBuilder::new();
        let x = qb.bind(21i64);
        qb.push(&format!("SELECT {x} + {x}"));

        let conn = Connection::open_in_memory().unwrap();
        let sum: i64 = qb.query_one(&conn, |row| row.get(0)).unwrap();
        assert_eq!(sum, 42);
    }

    #[test]
    fn text_and_null_values() {
        let mut qb = QueryBuilder::new();
        qb.push("SELECT ")
            .push_bind("abc".to_string())
            .push(", ")
            .push_bind(Value::Null);

        let conn = Connection::open_in_memory().unwrap();
        let (s, n): (String, Option<i64>) = qb
            .query_one(&conn, |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();
        assert_eq!(s, "abc");
        assert_eq!(n, None);
    }

    #[test]
    fn query_all_maps_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1), (2), (3);")
            .unwrap();

        let mut qb = QueryBuilder::new();
        qb.push("SELECT v FROM t WHERE v >= ")
            .push_bind(2i64)
            .push(" ORDER BY v");
        let values: Vec<i64> = qb.query_all(&conn, |row| row.get(0)).unwrap();
        assert_eq!(values, vec![2, 3]);
    }

    #[test]
    fn sql_errors_become_database_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let mut qb = QueryBuilder::new();
        qb.push("SELECT * FROM missing_table");
        let err = qb.query_all(&conn, |row| row.get::<_, i64>(0)).unwrap_err();
        assert_eq!(err.http_status(), 500);
    }
}
