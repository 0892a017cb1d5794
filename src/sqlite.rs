use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, Statement};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::Result;

/// Separator between columns in headers and data rows.
pub const COLUMN_SEPARATOR: &str = " | ";

/// Core value types for SQLite result cells
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => {
                let magnitude = r.abs();
                if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-4) {
                    write!(f, "{r:e}")
                } else {
                    write!(f, "{r}")
                }
            }
            Value::Text(s) => f.write_str(s),
            Value::Blob(bytes) => {
                f.write_str("x'")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("'")
            }
        }
    }
}

/// Open a SQLite database file. A missing parent directory is an error.
pub fn open(path: &Path) -> Result<Connection> {
    info!(path = %path.display(), "opening sqlite database");
    Ok(Connection::open(path)?)
}

/// Run every statement in `sql` on `conn`, rendering result sets to `out`.
///
/// Statements run in order. A statement without result columns prints
/// nothing. The first failure stops rendering and is returned.
pub fn execute_and_render<W: Write>(conn: &Connection, sql: &str, out: &mut W) -> Result<()> {
    let mut batch = Batch::new(conn, sql);
    while let Some(mut stmt) = batch.next()? {
        if stmt.column_count() == 0 {
            let changed = stmt.execute([])?;
            debug!(changed, "statement executed");
            continue;
        }
        render_rows(&mut stmt, out)?;
    }
    Ok(())
}

fn render_rows<W: Write>(stmt: &mut Statement<'_>, out: &mut W) -> Result<()> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let header = columns.join(COLUMN_SEPARATOR);
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.chars().count()))?;

    let mut rows = stmt.query([])?;
    let mut count = 0usize;
    while let Some(row) = rows.next()? {
        let mut fields = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            fields.push(Value::from(row.get_ref(idx)?).to_string());
        }
        writeln!(out, "{}", fields.join(COLUMN_SEPARATOR))?;
        count += 1;
    }
    debug!(rows = count, "result set rendered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(conn: &Connection, sql: &str) -> (String, Result<()>) {
        let mut out = Vec::new();
        let result = execute_and_render(conn, sql, &mut out);
        (String::from_utf8(out).unwrap(), result)
    }

    #[test]
    fn values_render_as_text() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::Real(1.5).to_string(), "1.5");
        assert_eq!(Value::Real(100000.0).to_string(), "100000");
        assert_eq!(Value::Real(0.0).to_string(), "0");
        assert_eq!(Value::Real(1e300).to_string(), "1e300");
        assert_eq!(Value::Real(-2.5e-7).to_string(), "-2.5e-7");
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
        assert_eq!(Value::Blob(vec![0x01, 0xab]).to_string(), "x'01ab'");
    }

    #[test]
    fn large_reals_render_in_exponent_form() {
        let conn = Connection::open_in_memory().unwrap();
        let (out, result) = render(&conn, "SELECT 1e300 AS x;");
        result.unwrap();
        assert_eq!(out, "x\n-\n1e300\n");
    }

    #[test]
    fn select_one_renders_header_rule_and_row() {
        let conn = Connection::open_in_memory().unwrap();
        let (out, result) = render(&conn, "SELECT 1;");
        result.unwrap();
        assert_eq!(out, "1\n-\n1\n");
    }

    #[test]
    fn nulls_and_multiple_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let (out, result) = render(&conn, "SELECT 1 AS a, NULL AS bee, 'x' AS c;");
        result.unwrap();
        assert_eq!(out, "a | bee | c\n-----------\n1 | NULL | x\n");
    }

    #[test]
    fn statements_without_columns_print_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        let (out, result) = render(
            &conn,
            "CREATE TABLE t (v TEXT); INSERT INTO t VALUES ('a'); INSERT INTO t VALUES ('b');",
        );
        result.unwrap();
        assert_eq!(out, "");

        let (out, result) = render(&conn, "SELECT v FROM t ORDER BY v;");
        result.unwrap();
        assert_eq!(out, "v\n-\na\nb\n");
    }

    #[test]
    fn syntax_error_is_returned() {
        let conn = Connection::open_in_memory().unwrap();
        let (out, result) = render(&conn, "SELEC 1;");
        assert!(result.is_err());
        assert_eq!(out, "");
    }

    #[test]
    fn failure_stops_remaining_statements() {
        let conn = Connection::open_in_memory().unwrap();
        let (out, result) = render(&conn, "SELECT 1; SELECT * FROM missing; SELECT 2;");
        assert!(result.is_err());
        assert_eq!(out, "1\n-\n1\n");
    }
}
