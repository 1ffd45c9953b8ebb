//! The database facade: normalized configuration, an open connection and the helpers
//! that rewrite table names and inline bindings for it.
//!
//! Anything the facade does not define itself is reached through [`Deref`] to the
//! underlying [`Connection`].

use std::ops::{Deref, DerefMut};

use tracing::{debug, info};

use crate::bind::Bindings;
use crate::compiler::PlaceholderCompiler;
use crate::config::{ConfigNormalizer, ConnectionDescriptor, RawConfig, keys};
use crate::connection::{Connection, ConnectionFactory, Row};
use crate::driver::DriverResolver;
use crate::error::{TabulaError, TabulaResult};
use crate::rewriter::{IdentifierRewriter, Selector};
use crate::schema::{ColumnInfo, ForeignKeyInfo, IndexInfo, SequenceInfo, TableInfo, ViewInfo};

/// An open database with its configuration.
pub struct Database<C: Connection> {
    connection: C,
    descriptor: ConnectionDescriptor,
    user_params: RawConfig,
    rewriter: IdentifierRewriter,
}

impl<C: Connection> std::fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.descriptor.driver)
            .field("host", &self.descriptor.host)
            .field("dbname", &self.descriptor.dbname)
            .field("table_prefix", &self.descriptor.table_prefix)
            .finish()
    }
}

impl<C: Connection> Database<C> {
    /// Normalize `config`, validate it and open a connection through `factory`.
    pub fn open<F>(config: &RawConfig, factory: &F) -> TabulaResult<Self>
    where
        F: ConnectionFactory<Connection = C>,
    {
        let resolver = DriverResolver::new(factory.available_drivers());
        let mut params = ConfigNormalizer::new(resolver.clone()).normalize(config);
        let descriptor = ConnectionDescriptor::from_params(&params, &resolver)?;

        params.remove(keys::PREFIX);
        params.insert(keys::DRIVER, descriptor.driver.id());

        info!(
            driver = %descriptor.driver,
            host = %descriptor.host,
            dbname = %descriptor.dbname,
            "Opening database connection"
        );
        let connection = factory.connect(&descriptor)?;
        let rewriter = IdentifierRewriter::new(
            connection.identifier_quote_char(),
            descriptor.table_prefix.clone(),
            descriptor.dbname.clone(),
        );

        Ok(Self {
            connection,
            descriptor,
            user_params: params,
            rewriter,
        })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// The underlying connection, mutably.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Consume the facade, keeping the connection.
    pub fn into_connection(self) -> C {
        self.connection
    }

    /// The validated descriptor.
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    /// The table prefix.
    pub fn table_prefix(&self) -> &str {
        &self.descriptor.table_prefix
    }

    /// The identifier quote character of the connection.
    pub fn quote_char(&self) -> char {
        self.rewriter.quote_char()
    }

    /// The normalized configuration, without the prefix.
    pub fn user_params(&self) -> &RawConfig {
        &self.user_params
    }

    /// The parameters the connection was opened with.
    pub fn connection_params(&self) -> RawConfig {
        self.descriptor.connection_params()
    }

    // ============== Identifier helpers ==============

    /// Trim whitespace and quote characters from table names.
    pub fn trim_table_selector(&self, selector: impl Into<Selector>) -> Selector {
        self.rewriter.trim(&selector.into())
    }

    /// Quote table names as identifiers.
    pub fn quote_identifiers(&self, selector: impl Into<Selector>) -> TabulaResult<Selector> {
        self.rewriter.quote_identifiers(&selector.into(), &self.connection)
    }

    /// Quote values as string literals.
    pub fn quotes(&self, selector: impl Into<Selector>) -> TabulaResult<Selector> {
        self.rewriter.quotes(&selector.into(), &self.connection)
    }

    /// Apply the table prefix to table names.
    pub fn prefix_tables(
        &self,
        selector: impl Into<Selector>,
        use_identifier: bool,
    ) -> TabulaResult<Selector> {
        self.rewriter.prefix_tables(&selector.into(), use_identifier)
    }

    /// Apply the table prefix to one table name.
    pub fn prefix(&self, table: &str, use_identifier: bool) -> String {
        self.rewriter.prefix_name(table, use_identifier)
    }

    // ============== Bindings ==============

    /// Inline `binds` into the `?` markers of `sql`.
    pub fn compile_binds(&self, sql: &str, binds: impl Into<Bindings>) -> TabulaResult<String> {
        PlaceholderCompiler::compile(sql, &binds.into(), &self.connection)
    }

    /// Inline `binds` and run the query.
    pub fn query_bind(&mut self, sql: &str, binds: impl Into<Bindings>) -> TabulaResult<Vec<Row>> {
        let compiled = self
            .compile_binds(sql, binds)
            .map_err(|e| e.with_context("query_bind"))?;
        debug!(sql = %compiled, "Running compiled query");
        self.connection.query(&compiled)
    }

    /// Run `sql` as a prepared statement with positional parameters.
    pub fn execute_prepare(
        &mut self,
        sql: &str,
        binds: impl Into<Bindings>,
    ) -> TabulaResult<Vec<Row>> {
        let binds = binds.into();
        debug!(sql = %sql, params = binds.len(), "Executing prepared statement");
        self.connection.fetch_all(sql, binds.as_slice())
    }

    // ============== Schema ==============

    /// Databases visible to the connection.
    pub fn list_databases(&mut self) -> TabulaResult<Vec<String>> {
        self.connection.list_databases()
    }

    /// Schema namespaces.
    pub fn list_namespace_names(&mut self) -> TabulaResult<Vec<String>> {
        self.connection.list_namespace_names()
    }

    /// Sequences.
    pub fn list_sequences(&mut self) -> TabulaResult<Vec<SequenceInfo>> {
        self.connection.list_sequences()
    }

    /// Names of all tables.
    pub fn list_table_names(&mut self) -> TabulaResult<Vec<String>> {
        self.connection.list_table_names()
    }

    /// All tables with their structure.
    pub fn list_tables(&mut self) -> TabulaResult<Vec<TableInfo>> {
        self.connection.list_tables()
    }

    /// Views.
    pub fn list_views(&mut self) -> TabulaResult<Vec<ViewInfo>> {
        self.connection.list_views()
    }

    /// Columns of a table.
    pub fn table_columns(&mut self, table: &str) -> TabulaResult<Vec<ColumnInfo>> {
        let table = valid_table_name(table)?;
        self.connection.list_table_columns(table)
    }

    /// Indexes of a table.
    pub fn table_indexes(&mut self, table: &str) -> TabulaResult<Vec<IndexInfo>> {
        let table = valid_table_name(table)?;
        self.connection.list_table_indexes(table)
    }

    /// Structure of a table.
    pub fn table_details(&mut self, table: &str) -> TabulaResult<TableInfo> {
        let table = valid_table_name(table)?;
        self.connection.list_table_details(table)
    }

    /// Foreign keys of a table.
    pub fn table_foreign_keys(&mut self, table: &str) -> TabulaResult<Vec<ForeignKeyInfo>> {
        let table = valid_table_name(table)?;
        self.connection.list_table_foreign_keys(table)
    }

    /// Whether every table exists, after applying the prefix.
    pub fn tables_exist(&mut self, tables: impl Into<Selector>) -> TabulaResult<bool> {
        let prefixed = self.prefix_tables(tables, false)?;
        let names: Vec<String> = prefixed.names().into_iter().map(str::to_string).collect();
        self.connection.tables_exist(&names)
    }
}

impl<C: Connection> Deref for Database<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.connection
    }
}

impl<C: Connection> DerefMut for Database<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.connection
    }
}

fn valid_table_name(table: &str) -> TabulaResult<&str> {
    let table = table.trim();
    if table.is_empty() {
        return Err(TabulaError::invalid_table_name(
            "Invalid parameter table name. Table name could not be empty.",
        ));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::BindValue;
    use crate::connection::{Quoter, SqlQuoter};
    use crate::driver::Driver;
    use crate::{ErrorCode, testing::RecordingFactory};
    use serde_json::json;

    fn open(config: RawConfig) -> TabulaResult<Database<crate::testing::RecordingConnection>> {
        Database::open(&config, &RecordingFactory::default())
    }

    #[test]
    fn test_open_minimal() {
        let db = open(RawConfig::new().with("name", "shop").with("prefix", " wp_ ")).unwrap();
        assert_eq!(db.descriptor().driver, Driver::PdoMysql);
        assert_eq!(db.table_prefix(), "wp_");
        assert_eq!(db.quote_char(), '`');
        assert!(db.user_params().get("prefix").is_none());
        assert_eq!(db.user_params().get_str("driver"), Some("pdo_mysql"));
        assert_eq!(db.connection_params().get_str("dbname"), Some("shop"));
    }

    #[test]
    fn test_open_failures() {
        let err = open(RawConfig::new().with("name", "")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);

        let err = open(RawConfig::new().with("name", "x").with("driver", "not-a-real-driver"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_factory_restricts_drivers() {
        let factory = RecordingFactory::with_drivers([Driver::PdoSqlite]);
        let err = Database::open(&RawConfig::new().with("name", "x"), &factory).unwrap_err();
        assert_eq!(err.message, "Selected driver unavailable");

        let db = Database::open(
            &RawConfig::new().with("driver", "sqlite").with("path", "/tmp/x.db"),
            &factory,
        )
        .unwrap();
        assert_eq!(db.descriptor().dbname, "/tmp/x.db");
    }

    #[test]
    fn test_prefix_helpers() {
        let db = open(RawConfig::new().with("name", "mydb").with("prefix", "wp_")).unwrap();
        assert_eq!(db.prefix("mydb.orders", false), "mydb.wp_orders");
        assert_eq!(db.prefix("orders", true), "`wp_orders`");
        assert_eq!(
            db.prefix_tables(vec!["a", "wp_b"], false).unwrap(),
            Selector::from(vec!["wp_a", "wp_b"])
        );
        assert_eq!(
            db.quote_identifiers("` x `").unwrap(),
            Selector::from("`x`")
        );
        assert_eq!(db.trim_table_selector(" `t` "), Selector::from("t"));
    }

    #[test]
    fn test_query_bind() {
        let mut db = open(RawConfig::new().with("name", "x")).unwrap();
        db.query_bind("SELECT * FROM t WHERE id = ? AND name = ?", vec![
            BindValue::from(3),
            BindValue::from("o'k"),
        ])
        .unwrap();
        assert_eq!(
            db.connection().statements(),
            ["SELECT * FROM t WHERE id = 3 AND name = 'o''k'"]
        );

        let err = db
            .query_bind("SELECT '?' , ?", vec![1, 2])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BindCountMismatch);
        assert_eq!(err.context.operation.as_deref(), Some("query_bind"));
        assert_eq!(db.connection().statements().len(), 1);
    }

    #[test]
    fn test_execute_prepare_passes_params() {
        let mut db = open(RawConfig::new().with("name", "x")).unwrap();
        db.execute_prepare("SELECT ?", BindValue::from("a")).unwrap();
        assert_eq!(db.connection().params(), [vec![BindValue::from("a")]]);
    }

    #[test]
    fn test_table_name_validation() {
        let mut db = open(RawConfig::new().with("name", "x")).unwrap();
        let err = db.table_columns("   ").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTableName);
        assert!(db.table_details(" users ").unwrap_err().is_unsupported());
    }

    #[test]
    fn test_tables_exist_prefixes_names() {
        let mut db = open(RawConfig::new().with("name", "mydb").with("prefix", "wp_")).unwrap();
        assert!(db.tables_exist(vec!["users", "mydb.posts"]).unwrap());
        assert_eq!(
            db.connection().checked_tables(),
            [vec!["wp_users".to_string(), "mydb.wp_posts".to_string()]]
        );
    }

    #[test]
    fn test_delegation_through_deref() {
        let mut db = open(RawConfig::new().with("name", "x")).unwrap();
        assert!(db.list_sequences().unwrap_err().is_unsupported());
        assert!(db.begin_transaction().unwrap_err().is_unsupported());
        assert_eq!(db.quote(&BindValue::from("a")), "'a'");
        assert_eq!(
            db.quote_identifier("a.b"),
            SqlQuoter::new('`').quote_identifier("a.b")
        );
    }

    #[test]
    fn test_options_reach_connection() {
        let db = open(
            RawConfig::new()
                .with("name", "x")
                .with("timeout", 9)
                .with("options", json!({"1000": 1})),
        )
        .unwrap();
        let descriptor = db.connection().descriptor();
        assert_eq!(descriptor.options.to_value(), json!({"2": 9, "3": 2, "1000": 1}));
        assert_eq!(descriptor.timeout, Some(9));
    }
}
