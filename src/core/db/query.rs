/// Query Execution Module
///
/// Every execution on a `DatabaseAccessor` yields a `Cursor`: the column names,
/// the rows the statement returned, and the change counters reported by the
/// engine. Rows hold owned `Value`s so the cursor outlives the connection.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, Params};

/// One result row, in column order.
pub type Row = Vec<Value>;

/// Result of one statement or script execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    /// Column names from the statement (empty for statements without output)
    pub columns: Vec<String>,
    /// Rows returned by the statement, in the order the engine produced them
    pub rows: Vec<Row>,
    /// Number of rows inserted, updated or deleted
    pub rows_affected: usize,
    /// Rowid of the most recent successful insert on the connection
    pub last_insert_rowid: i64,
}

impl Cursor {
    /// Number of rows returned
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Returns the index of the named column, ignoring ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Collects one column across all rows.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

impl IntoIterator for Cursor {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Cursor {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Prepares and runs one statement with bound parameters and commits it.
///
/// Statements that declare result columns are stepped to completion and their
/// rows collected; all others are executed for their change count. A
/// transaction left open by the statement (e.g. a bare `BEGIN`) is committed
/// before returning, so every successful call is durable on its own.
pub(crate) fn run_statement<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<Cursor> {
    let before = total_changes(conn)?;
    let mut cursor = collect_statement(conn, sql, params)?;

    if cursor.rows_affected == 0 && !cursor.columns.is_empty() && total_changes(conn)? > before {
        // INSERT/UPDATE/DELETE ... RETURNING
        cursor.rows_affected = last_changes(conn)?;
    }

    commit_pending(conn)?;
    cursor.last_insert_rowid = conn.last_insert_rowid();
    Ok(cursor)
}

fn collect_statement<P: Params>(conn: &Connection, sql: &str, params: P) -> rusqlite::Result<Cursor> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();

    if column_count == 0 {
        let rows_affected = stmt.execute(params)?;
        return Ok(Cursor {
            rows_affected,
            ..Cursor::default()
        });
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = Vec::new();
    let mut result = stmt.query(params)?;
    while let Some(row) = result.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(row.get::<_, Value>(i)?);
        }
        rows.push(values);
    }

    Ok(Cursor {
        columns,
        rows,
        ..Cursor::default()
    })
}

/// Runs a semicolon-delimited script and commits once.
///
/// A transaction already pending on the connection is committed first. The
/// script then runs as written: statements outside an explicit
/// `BEGIN ... COMMIT` take effect one by one, and a transaction the script
/// leaves open is committed at the end. When a statement fails, a transaction
/// the script opened is rolled back.
pub(crate) fn run_script(conn: &Connection, script: &str) -> rusqlite::Result<Cursor> {
    commit_pending(conn)?;
    let before = total_changes(conn)?;

    if let Err(e) = conn.execute_batch(script) {
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        return Err(e);
    }
    commit_pending(conn)?;

    let after = total_changes(conn)?;
    Ok(Cursor {
        rows_affected: usize::try_from(after - before).unwrap_or(0),
        last_insert_rowid: conn.last_insert_rowid(),
        ..Cursor::default()
    })
}

/// Commits the open transaction, if any.
fn commit_pending(conn: &Connection) -> rusqlite::Result<()> {
    if !conn.is_autocommit() {
        conn.execute_batch("COMMIT")?;
    }
    Ok(())
}

fn last_changes(conn: &Connection) -> rusqlite::Result<usize> {
    conn.query_row("SELECT changes()", [], |row| row.get::<_, i64>(0))
        .map(|n| usize::try_from(n).unwrap_or(0))
}

fn total_changes(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT total_changes()", [], |row| row.get(0))
}

/// Formats a SQLite value for display
///
/// Text is single-quoted so a formatted row reads like a tuple literal.
pub fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => format!("'{}'", String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

/// Formats a row as a parenthesized tuple, e.g. `(1, 'John', 'Snow', 19)`.
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(|v| format_value(ValueRef::from(v))).collect();
    format!("({})", cells.join(", "))
}
