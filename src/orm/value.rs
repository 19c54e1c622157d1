//! Bound SQL parameter values

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

/// Represents a SQL value that can be bound to a query.
///
/// Every fragment produced by the clause builder carries its parameters as
/// `SqlValue`s so binding is exhaustive over the four SQLite storage classes
/// the catalog uses.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Blob(Vec<u8>),
    Null,
}

impl SqlValue {
    /// Bind this value as the next positional parameter of a sqlx query
    pub fn bind_to_query<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Blob(b) => query.bind(b.as_slice()),
            SqlValue::Null => query.bind(None::<String>),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

/// Bind a full parameter list, in order, to a raw SQL statement.
pub fn bind_all<'q>(sql: &'q str, values: &'q [SqlValue]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    values
        .iter()
        .fold(sqlx::query(sql), |query, value| value.bind_to_query(query))
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Blob(value)
    }
}

/// Dates are stored as ISO `YYYY-MM-DD` text.
impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Text(value.to_rfc3339())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_none_is_null() {
        let value: SqlValue = None::<i64>.into();
        assert!(value.is_null());
    }

    #[test]
    fn test_date_is_iso_text() {
        let date = NaiveDate::from_ymd_opt(2004, 7, 9).unwrap();
        assert_eq!(SqlValue::from(date), SqlValue::Text("2004-07-09".to_string()));
    }
}
