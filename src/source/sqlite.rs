use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags};
use tracing::{debug, info, warn};

use crate::constants::columns::RECORD_COLUMNS;
use crate::constants::store::FINAL_TABLE;
use crate::data::{Column, Dataset, Value};
use crate::errors::PipelineError;
use crate::provision::{ensure_tables, quote_identifier};
use crate::source::{BugSource, validate_limit};
use crate::types::{SourceId, TableName};

/// Source reading the `final` relation of a SQLite database file.
///
/// Every call opens its own connection and closes it before returning, on
/// success and on error alike.
#[derive(Clone, Debug)]
pub struct SqliteSource {
    id: SourceId,
    path: PathBuf,
    table: TableName,
}

impl SqliteSource {
    /// Create a source reading `final` from the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: format!("sqlite:{}", path.display()),
            path,
            table: FINAL_TABLE.to_string(),
        }
    }

    /// Read records from `table` instead of `final`.
    pub fn with_table(mut self, table: impl Into<TableName>) -> Self {
        self.table = table.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The single read query issued by `fetch`.
    pub fn select_sql(&self, limit: Option<usize>) -> Result<String, PipelineError> {
        let mut sql = format!(
            "SELECT {} FROM {}",
            RECORD_COLUMNS.join(", "),
            quote_identifier(&self.table)?
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(sql)
    }

    /// Run `f` with a read-only connection that is closed when `f` returns.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, PipelineError>,
    ) -> Result<T, PipelineError> {
        let conn = self.connect(
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        scoped(conn, f).map_err(|err| self.surface_lazy_open(err))
    }

    /// Create `reports` and the auxiliary `tables` if they do not exist yet.
    ///
    /// Opens the database read-write, creating the file when missing.
    pub fn provision<S: AsRef<str>>(&self, tables: &[S]) -> Result<(), PipelineError> {
        let conn = self.connect(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        scoped(conn, |conn| ensure_tables(conn, tables)).map_err(|err| self.surface_lazy_open(err))
    }

    fn connect(&self, flags: OpenFlags) -> Result<Connection, PipelineError> {
        info!(path = %self.path.display(), "connecting to database");
        Connection::open_with_flags(&self.path, flags).map_err(|err| self.connection_error(err))
    }

    fn connection_error(&self, err: rusqlite::Error) -> PipelineError {
        PipelineError::Connection {
            location: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Failures SQLite defers until the first statement still mean the database is unreachable.
    fn surface_lazy_open(&self, err: PipelineError) -> PipelineError {
        match err {
            PipelineError::Query(err)
                if matches!(
                    err.sqlite_error_code(),
                    Some(ErrorCode::NotADatabase | ErrorCode::CannotOpen)
                ) =>
            {
                self.connection_error(err)
            }
            other => other,
        }
    }
}

fn scoped<T>(
    conn: Connection,
    f: impl FnOnce(&Connection) -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    let result = f(&conn);
    let closed = conn.close();
    let value = result?;
    if let Err((_, err)) = closed {
        warn!(error = %err, "closing database connection failed");
        return Err(PipelineError::Query(err));
    }
    Ok(value)
}

impl BugSource for SqliteSource {
    fn id(&self) -> &str {
        &self.id
    }

    /// Issues exactly one `SELECT` on a fresh read-only connection.
    fn fetch(&self, limit: Option<usize>) -> Result<Dataset, PipelineError> {
        validate_limit(limit)?;
        let sql = self.select_sql(limit)?;
        let dataset = self.with_connection(|conn| read_dataset(conn, &sql))?;
        info!(
            source = %self.id,
            rows = dataset.n_rows(),
            "loaded records"
        );
        Ok(dataset)
    }

    fn reported_record_count(&self) -> Result<u128, PipelineError> {
        let sql = format!("SELECT count(*) FROM {}", quote_identifier(&self.table)?);
        let count =
            self.with_connection(|conn| Ok(conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?))?;
        Ok(u128::try_from(count).unwrap_or_default())
    }
}

/// Execute `sql` and collect the result set column by column.
pub fn read_dataset(conn: &Connection, sql: &str) -> Result<Dataset, PipelineError> {
    debug!(sql, "executing query");
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut columns: Vec<Column> = vec![Vec::new(); names.len()];
    let mut rows = stmt.query([])?;
    let mut row_idx = 0usize;
    while let Some(row) = rows.next()? {
        for (col_idx, column) in columns.iter_mut().enumerate() {
            let value = match row.get_ref(col_idx)? {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(value) => Value::Integer(value),
                ValueRef::Real(value) => Value::Float(value),
                ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                    Ok(text) => Value::Text(text.to_string()),
                    Err(_) => {
                        return Err(PipelineError::TypeMismatch {
                            column: names[col_idx].clone(),
                            row: row_idx,
                            expected: "text",
                            found: "invalid utf-8",
                        });
                    }
                },
                ValueRef::Blob(_) => {
                    return Err(PipelineError::TypeMismatch {
                        column: names[col_idx].clone(),
                        row: row_idx,
                        expected: "text, integer, real or null",
                        found: "blob",
                    });
                }
            };
            column.push(value);
        }
        row_idx += 1;
    }
    Dataset::from_columns(names.into_iter().zip(columns))
}
