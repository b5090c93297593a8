//! Idempotent creation of the raw history tables.

use rusqlite::Connection;
use tracing::debug;

use crate::constants::store::{REPORTS_TABLE, STATUS_MAX_LEN};
use crate::errors::PipelineError;

/// Quote `name` as an SQL identifier after checking it is a plain `[A-Za-z_][A-Za-z0-9_]*` name.
pub fn quote_identifier(name: &str) -> Result<String, PipelineError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(PipelineError::Configuration(format!(
            "invalid table name '{name}'"
        )));
    }
    Ok(format!("\"{name}\""))
}

fn reports_ddl() -> Result<String, PipelineError> {
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (
            opening             TIMESTAMP,
            reporter            BIGINT,
            current_status      VARCHAR({STATUS_MAX_LEN}),
            current_resolution  VARCHAR({STATUS_MAX_LEN}),
            id                  BIGINT NOT NULL
        )",
        quote_identifier(REPORTS_TABLE)?
    ))
}

fn history_ddl(table: &str) -> Result<String, PipelineError> {
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (
            when_created    TIMESTAMP,
            what            TEXT,
            who             BIGINT,
            id              BIGINT NOT NULL
        )",
        quote_identifier(table)?
    ))
}

/// Create `reports` plus one history table per entry of `tables`, skipping existing ones.
///
/// Every name is validated before anything is executed, so an invalid name
/// leaves the database untouched.
pub fn ensure_tables<S: AsRef<str>>(conn: &Connection, tables: &[S]) -> Result<(), PipelineError> {
    let mut statements = vec![reports_ddl()?];
    for table in tables {
        statements.push(history_ddl(table.as_ref())?);
    }
    for statement in &statements {
        conn.execute_batch(statement)?;
    }
    debug!(tables = tables.len() + 1, "tables provisioned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_reports_and_history_tables() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_tables(&conn, &["assigned_to", "cc"]).unwrap();
        assert_eq!(table_names(&conn), vec!["assigned_to", "cc", "reports"]);
    }

    #[test]
    fn provisioning_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_tables(&conn, &["cc"]).unwrap();
        conn.execute("INSERT INTO cc (what, who, id) VALUES ('x', 1, 2)", [])
            .unwrap();
        ensure_tables(&conn, &["cc"]).unwrap();
        let rows: i64 = conn
            .query_row("SELECT count(*) FROM cc", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn id_is_not_null() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_tables::<&str>(&conn, &[]).unwrap();
        assert!(
            conn.execute("INSERT INTO reports (reporter) VALUES (1)", [])
                .is_err()
        );
    }

    #[test]
    fn invalid_names_are_rejected_before_execution() {
        let conn = Connection::open_in_memory().unwrap();
        let err = ensure_tables(&conn, &["ok", "bad; DROP TABLE reports"]).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(table_names(&conn).is_empty());
    }

    #[test]
    fn quote_identifier_rules() {
        assert_eq!(quote_identifier("final").unwrap(), "\"final\"");
        assert!(quote_identifier("_x1").is_ok());
        assert!(quote_identifier("1x").is_err());
        assert!(quote_identifier("").is_err());
        assert!(quote_identifier("a b").is_err());
    }
}
