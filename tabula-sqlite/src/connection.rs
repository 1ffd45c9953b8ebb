//! SQLite connection wrapper.

use std::time::Duration;

use rusqlite::params_from_iter;
use tabula_core::{
    BindValue, ColumnInfo, Connection, ForeignKeyInfo, IndexInfo, Quoter, ReferentialAction, Row,
    SequenceInfo, SqlQuoter, TableInfo, TabulaResult, ViewInfo,
};
use tracing::{debug, trace};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};
use crate::types::{bind_to_sqlite, row_to_map};

/// A wrapper around a SQLite connection.
pub struct SqliteConnection {
    conn: Option<rusqlite::Connection>,
    name: String,
    quoter: SqlQuoter,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("name", &self.name)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl SqliteConnection {
    /// Open a connection and apply the configured pragmas.
    pub fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        let (conn, name) = match &config.path {
            DatabasePath::Memory => (rusqlite::Connection::open_in_memory()?, ":memory:".to_string()),
            DatabasePath::File(path) => (
                rusqlite::Connection::open(path)?,
                path.display().to_string(),
            ),
        };

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        if let Some(mode) = config.journal_mode {
            let applied: String = conn.pragma_update_and_check(
                None,
                "journal_mode",
                mode.as_pragma(),
                |row| row.get(0),
            )?;
            debug!(journal_mode = %applied, "Journal mode applied");
        }

        debug!(database = %name, "SQLite connection opened");
        Ok(Self {
            conn: Some(conn),
            name,
            quoter: SqlQuoter::new('"'),
        })
    }

    /// Open an in-memory database with default settings.
    pub fn open_in_memory() -> SqliteResult<Self> {
        Self::open(&SqliteConfig::default())
    }

    /// The underlying rusqlite connection.
    pub fn raw(&self) -> SqliteResult<&rusqlite::Connection> {
        self.conn.as_ref().ok_or(SqliteError::Closed)
    }

    fn rows(&self, sql: &str, params: &[BindValue], limit: Option<usize>) -> SqliteResult<Vec<Row>> {
        let conn = self.raw()?;
        debug!(sql = %sql, params = params.len(), "Executing query");

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(params.iter().map(bind_to_sqlite)))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(row_to_map(row, &columns)?);
            if limit.is_some_and(|n| out.len() >= n) {
                break;
            }
        }
        trace!(rows = out.len(), "Query complete");
        Ok(out)
    }

    fn names(&self, sql: &str, arg: Option<&str>) -> SqliteResult<Vec<String>> {
        let conn = self.raw()?;
        let mut stmt = conn.prepare(sql)?;
        let names = match arg {
            Some(arg) => stmt
                .query_map([arg], |row| row.get::<_, Option<String>>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], |row| row.get::<_, Option<String>>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(names.into_iter().flatten().collect())
    }

    fn table_names(&self) -> SqliteResult<Vec<String>> {
        self.names(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             ORDER BY name",
            None,
        )
    }

    fn columns_of(&self, table: &str) -> SqliteResult<Vec<ColumnInfo>> {
        let conn = self.raw()?;
        let mut stmt = conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    db_type: row.get(1)?,
                    nullable: row.get::<_, i64>(2)? == 0,
                    default: row.get(3)?,
                    is_primary_key: row.get::<_, i64>(4)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn indexes_of(&self, table: &str) -> SqliteResult<Vec<IndexInfo>> {
        let listed = {
            let conn = self.raw()?;
            let mut stmt =
                conn.prepare("SELECT name, \"unique\", origin FROM pragma_index_list(?1) ORDER BY seq")?;
            stmt.query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? != 0,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut indexes = Vec::with_capacity(listed.len());
        for (name, is_unique, origin) in listed {
            let columns = self.names(
                "SELECT name FROM pragma_index_info(?1) ORDER BY seqno",
                Some(&name),
            )?;
            indexes.push(IndexInfo {
                name,
                columns,
                is_unique,
                is_primary: origin == "pk",
            });
        }
        Ok(indexes)
    }

    fn foreign_keys_of(&self, table: &str) -> SqliteResult<Vec<ForeignKeyInfo>> {
        let conn = self.raw()?;
        let mut stmt = conn.prepare(
            "SELECT id, \"table\", \"from\", \"to\", on_update, on_delete \
             FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
        )?;
        let rows = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // One row per column; rows sharing an id form one constraint.
        let mut keys: Vec<(i64, ForeignKeyInfo)> = Vec::new();
        for (id, referenced_table, from, to, on_update, on_delete) in rows {
            if keys.last().is_none_or(|(last, _)| *last != id) {
                keys.push((
                    id,
                    ForeignKeyInfo {
                        name: None,
                        columns: Vec::new(),
                        referenced_table,
                        referenced_columns: Vec::new(),
                        on_delete: ReferentialAction::parse(&on_delete),
                        on_update: ReferentialAction::parse(&on_update),
                    },
                ));
            }
            if let Some((_, fk)) = keys.last_mut() {
                fk.columns.push(from);
                fk.referenced_columns.extend(to);
            }
        }
        Ok(keys.into_iter().map(|(_, fk)| fk).collect())
    }

    fn details_of(&self, table: &str) -> SqliteResult<TableInfo> {
        Ok(TableInfo {
            name: table.to_string(),
            columns: self.columns_of(table)?,
            primary_key: self.names(
                "SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk",
                Some(table),
            )?,
            indexes: self.indexes_of(table)?,
            foreign_keys: self.foreign_keys_of(table)?,
        })
    }

    fn count(&self, sql: &str, arg: &str) -> SqliteResult<i64> {
        Ok(self.raw()?.query_row(sql, [arg], |row| row.get(0))?)
    }

    fn sequences(&self) -> SqliteResult<Vec<SequenceInfo>> {
        let has_sequences = self.count(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            "sqlite_sequence",
        )? > 0;
        if !has_sequences {
            return Ok(Vec::new());
        }

        let conn = self.raw()?;
        let mut stmt = conn.prepare("SELECT name, seq FROM sqlite_sequence ORDER BY name")?;
        let sequences = stmt
            .query_map([], |row| {
                Ok(SequenceInfo {
                    name: row.get(0)?,
                    current: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sequences)
    }

    fn views(&self) -> SqliteResult<Vec<ViewInfo>> {
        let conn = self.raw()?;
        let mut stmt =
            conn.prepare("SELECT name, sql FROM sqlite_master WHERE type = 'view' ORDER BY name")?;
        let views = stmt
            .query_map([], |row| {
                Ok(ViewInfo {
                    name: row.get(0)?,
                    definition: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }

    fn shutdown(&mut self) -> SqliteResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| SqliteError::Sqlite(e))?;
            debug!(database = %self.name, "SQLite connection closed");
        }
        Ok(())
    }
}

impl Quoter for SqliteConnection {
    fn quote(&self, value: &BindValue) -> String {
        self.quoter.quote(value)
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        self.quoter.quote_identifier(identifier)
    }
}

impl Connection for SqliteConnection {
    fn identifier_quote_char(&self) -> char {
        self.quoter.quote_char()
    }

    fn database(&self) -> TabulaResult<String> {
        Ok(self.name.clone())
    }

    fn is_connected(&self) -> TabulaResult<bool> {
        Ok(self.conn.is_some())
    }

    fn close(&mut self) -> TabulaResult<()> {
        Ok(self.shutdown()?)
    }

    fn ping(&mut self) -> TabulaResult<()> {
        let conn = self.raw()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(SqliteError::from)?;
        Ok(())
    }

    fn begin_transaction(&mut self) -> TabulaResult<()> {
        self.raw()?.execute_batch("BEGIN").map_err(SqliteError::from)?;
        Ok(())
    }

    fn commit(&mut self) -> TabulaResult<()> {
        self.raw()?.execute_batch("COMMIT").map_err(SqliteError::from)?;
        Ok(())
    }

    fn roll_back(&mut self) -> TabulaResult<()> {
        self.raw()?.execute_batch("ROLLBACK").map_err(SqliteError::from)?;
        Ok(())
    }

    fn is_transaction_active(&self) -> TabulaResult<bool> {
        Ok(!self.raw()?.is_autocommit())
    }

    fn exec(&mut self, sql: &str) -> TabulaResult<()> {
        debug!(sql = %sql, "Executing batch");
        self.raw()?.execute_batch(sql).map_err(SqliteError::from)?;
        Ok(())
    }

    fn execute_update(&mut self, sql: &str, params: &[BindValue]) -> TabulaResult<u64> {
        debug!(sql = %sql, params = params.len(), "Executing statement");
        let affected = self
            .raw()?
            .execute(sql, params_from_iter(params.iter().map(bind_to_sqlite)))
            .map_err(SqliteError::from)?;
        Ok(affected as u64)
    }

    fn query(&mut self, sql: &str) -> TabulaResult<Vec<Row>> {
        Ok(self.rows(sql, &[], None)?)
    }

    fn fetch_all(&mut self, sql: &str, params: &[BindValue]) -> TabulaResult<Vec<Row>> {
        Ok(self.rows(sql, params, None)?)
    }

    fn fetch_assoc(&mut self, sql: &str, params: &[BindValue]) -> TabulaResult<Option<Row>> {
        Ok(self.rows(sql, params, Some(1))?.into_iter().next())
    }

    fn last_insert_id(&self) -> TabulaResult<i64> {
        Ok(self.raw()?.last_insert_rowid())
    }

    fn list_databases(&mut self) -> TabulaResult<Vec<String>> {
        Ok(self.names("SELECT name FROM pragma_database_list ORDER BY seq", None)?)
    }

    fn list_sequences(&mut self) -> TabulaResult<Vec<SequenceInfo>> {
        Ok(self.sequences()?)
    }

    fn list_table_names(&mut self) -> TabulaResult<Vec<String>> {
        Ok(self.table_names()?)
    }

    fn list_tables(&mut self) -> TabulaResult<Vec<TableInfo>> {
        let mut tables = Vec::new();
        for name in self.table_names()? {
            tables.push(self.details_of(&name)?);
        }
        Ok(tables)
    }

    fn list_table_columns(&mut self, table: &str) -> TabulaResult<Vec<ColumnInfo>> {
        Ok(self.columns_of(table)?)
    }

    fn list_table_indexes(&mut self, table: &str) -> TabulaResult<Vec<IndexInfo>> {
        Ok(self.indexes_of(table)?)
    }

    fn list_table_details(&mut self, table: &str) -> TabulaResult<TableInfo> {
        Ok(self.details_of(table)?)
    }

    fn list_views(&mut self) -> TabulaResult<Vec<ViewInfo>> {
        Ok(self.views()?)
    }

    fn list_table_foreign_keys(&mut self, table: &str) -> TabulaResult<Vec<ForeignKeyInfo>> {
        Ok(self.foreign_keys_of(table)?)
    }

    fn tables_exist(&mut self, tables: &[String]) -> TabulaResult<bool> {
        for table in tables {
            let found = self.count(
                "SELECT COUNT(*) FROM sqlite_master \
                 WHERE type IN ('table', 'view') AND lower(name) = lower(?1)",
                table,
            )?;
            if found == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            debug!(error = %e, "Failed to close SQLite connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SCHEMA: &str = "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            name TEXT DEFAULT 'anon'
        );
        CREATE TABLE posts (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT
        );
        CREATE INDEX idx_posts_user ON posts(user_id);
        CREATE VIEW user_emails AS SELECT email FROM users;
    ";

    fn conn() -> SqliteConnection {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.exec(SCHEMA).unwrap();
        conn
    }

    #[test]
    fn test_fetch_and_insert() {
        let mut conn = conn();
        let affected = conn
            .execute_update(
                "INSERT INTO users (email) VALUES (?)",
                &[BindValue::from("a@example.com")],
            )
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(conn.last_insert_id().unwrap(), 1);

        let rows = conn.query("SELECT id, email, name FROM users").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["email"], json!("a@example.com"));
        assert_eq!(rows[0]["name"], json!("anon"));

        let row = conn
            .fetch_assoc("SELECT email FROM users WHERE id = ?", &[BindValue::from(1)])
            .unwrap();
        assert_eq!(row.unwrap()["email"], json!("a@example.com"));
        assert!(
            conn.fetch_assoc("SELECT email FROM users WHERE id = ?", &[BindValue::from(9)])
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_transactions() {
        let mut conn = conn();
        assert!(!conn.is_transaction_active().unwrap());
        conn.begin_transaction().unwrap();
        assert!(conn.is_transaction_active().unwrap());
        conn.exec("INSERT INTO users (email) VALUES ('x@example.com')").unwrap();
        conn.roll_back().unwrap();
        assert!(!conn.is_transaction_active().unwrap());
        assert!(conn.query("SELECT * FROM users").unwrap().is_empty());
    }

    #[test]
    fn test_schema_listing() {
        let mut conn = conn();
        assert_eq!(conn.list_table_names().unwrap(), vec!["posts", "users"]);

        let columns = conn.list_table_columns("users").unwrap();
        assert_eq!(columns.len(), 3);
        assert!(columns[0].is_primary_key);
        assert!(!columns[1].nullable);
        assert_eq!(columns[2].default.as_deref(), Some("'anon'"));

        let fks = conn.list_table_foreign_keys("posts").unwrap();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].referenced_table, "users");
        assert_eq!(fks[0].columns, vec!["user_id"]);
        assert_eq!(fks[0].on_delete, ReferentialAction::Cascade);

        let indexes = conn.list_table_indexes("posts").unwrap();
        assert!(indexes.iter().any(|i| i.name == "idx_posts_user" && !i.is_unique));

        let details = conn.list_table_details("users").unwrap();
        assert_eq!(details.primary_key, vec!["id"]);
        assert!(details.indexes.iter().any(|i| i.is_unique));

        let views = conn.list_views().unwrap();
        assert_eq!(views[0].name, "user_emails");
        assert!(views[0].definition.as_deref().unwrap().contains("SELECT email"));

        assert_eq!(conn.list_databases().unwrap(), vec!["main"]);
    }

    #[test]
    fn test_sequences() {
        let mut conn = conn();
        assert!(conn.list_sequences().unwrap().is_empty());
        conn.exec("INSERT INTO users (email) VALUES ('a'), ('b')").unwrap();
        let sequences = conn.list_sequences().unwrap();
        assert_eq!(sequences[0].name, "users");
        assert_eq!(sequences[0].current, Some(2));
    }

    #[test]
    fn test_tables_exist() {
        let mut conn = conn();
        assert!(conn.tables_exist(&["users".into(), "POSTS".into()]).unwrap());
        assert!(!conn.tables_exist(&["users".into(), "missing".into()]).unwrap());
        assert!(conn.tables_exist(&[]).unwrap());
    }

    #[test]
    fn test_close() {
        let mut conn = conn();
        assert!(conn.is_connected().unwrap());
        conn.ping().unwrap();
        conn.close().unwrap();
        assert!(!conn.is_connected().unwrap());
        let err = conn.query("SELECT 1").unwrap_err();
        assert_eq!(err.code, tabula_core::ErrorCode::ConnectionFailed);
        conn.close().unwrap();
    }

    #[test]
    fn test_unsupported_namespace_listing() {
        let mut conn = conn();
        assert!(conn.list_namespace_names().unwrap_err().is_unsupported());
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let config = SqliteConfig {
            path: DatabasePath::File(path.clone()),
            journal_mode: Some(crate::config::JournalMode::Wal),
            ..SqliteConfig::default()
        };
        let mut conn = SqliteConnection::open(&config).unwrap();
        conn.exec("CREATE TABLE t (x INTEGER)").unwrap();
        assert_eq!(conn.database().unwrap(), path.display().to_string());
        let mode = conn.query("PRAGMA journal_mode").unwrap();
        assert_eq!(mode[0]["journal_mode"], json!("wal"));
    }
}
