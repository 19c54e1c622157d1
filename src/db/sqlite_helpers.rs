//! Generic SQLite helpers shared by every entity repository
//!
//! Placeholder lists, id/count query shapes, pagination and the small
//! execute-and-decode routines the repositories build on.

use sqlx::{Row, SqliteConnection};

use crate::error::Result;
use crate::models::Pagination;
use crate::orm::{bind_all, SqlValue};

// ============================================================================
// Query Building Helpers
// ============================================================================

/// Build an IN-list placeholder for `count` values, e.g. `(?, ?, ?)`.
///
/// An empty list renders as `(NULL)`, which matches nothing; callers that need
/// exclusion semantics must skip empty lists instead.
pub fn in_binding(count: usize) -> String {
    if count == 0 {
        return "(NULL)".to_string();
    }
    let placeholders: Vec<&str> = (0..count).map(|_| "?").collect();
    format!("({})", placeholders.join(", "))
}

/// `SELECT <table>.id FROM <table>`; the query body joins and filters are appended to this.
pub fn select_ids(table: &str) -> String {
    format!("SELECT {table}.id FROM {table}")
}

/// Wrap an id-selecting query so it returns the number of rows it would yield
pub fn build_count_query(inner: &str) -> String {
    format!("SELECT COUNT(*) FROM ({inner}) AS matched")
}

/// ` LIMIT n OFFSET m`, or nothing when unpaginated
pub fn pagination_clause(pagination: Option<Pagination>) -> String {
    match pagination {
        Some(p) if p.offset > 0 => format!(" LIMIT {} OFFSET {}", p.limit, p.offset),
        Some(p) => format!(" LIMIT {}", p.limit),
        None => String::new(),
    }
}

// ============================================================================
// Execution Helpers
// ============================================================================

/// Run a query that selects a single integer column and collect it
pub async fn fetch_ids(conn: &mut SqliteConnection, sql: &str, params: &[SqlValue]) -> Result<Vec<i64>> {
    tracing::debug!(sql = %sql, params = params.len(), "Executing id query");
    let rows = bind_all(sql, params).fetch_all(&mut *conn).await?;
    let ids = rows
        .iter()
        .map(|row| row.try_get::<i64, _>(0))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Run a `SELECT COUNT(*)` style query
pub async fn run_count_query(conn: &mut SqliteConnection, sql: &str, params: &[SqlValue]) -> Result<i64> {
    tracing::debug!(sql = %sql, params = params.len(), "Executing count query");
    let row = bind_all(sql, params).fetch_one(&mut *conn).await?;
    Ok(row.try_get::<i64, _>(0)?)
}

/// `DELETE FROM <table> WHERE <column> = ?`, returning the affected row count.
///
/// `table` and `column` are compile-time identifiers, never user input.
pub async fn execute_delete_by(
    conn: &mut SqliteConnection,
    table: &'static str,
    column: &'static str,
    id: i64,
) -> Result<u64> {
    let sql = format!("DELETE FROM {table} WHERE {column} = ?");
    tracing::debug!(sql = %sql, id, "Executing delete");
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Read a single nullable BLOB; a missing row and a NULL both come back empty.
pub async fn get_blob(conn: &mut SqliteConnection, sql: &str, id: i64) -> Result<Vec<u8>> {
    let row: Option<(Option<Vec<u8>>,)> = sqlx::query_as(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.and_then(|(data,)| data).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_binding() {
        assert_eq!(in_binding(1), "(?)");
        assert_eq!(in_binding(3), "(?, ?, ?)");
        assert_eq!(in_binding(0), "(NULL)");
    }

    #[test]
    fn test_count_query_wraps_inner() {
        let sql = build_count_query("SELECT movies.id FROM movies GROUP BY movies.id");
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM (SELECT movies.id FROM movies GROUP BY movies.id) AS matched"
        );
    }

    #[test]
    fn test_pagination_clause() {
        assert_eq!(pagination_clause(None), "");
        assert_eq!(
            pagination_clause(Some(Pagination { limit: 10, offset: 0 })),
            " LIMIT 10"
        );
        assert_eq!(
            pagination_clause(Some(Pagination {
                limit: 10,
                offset: 20
            })),
            " LIMIT 10 OFFSET 20"
        );
    }
}
