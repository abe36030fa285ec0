//! StarRocks warehouse client
//!
//! StarRocks speaks the MySQL wire protocol, so the production transport is
//! [`MySqlConnectionFactory`]. Every operation opens its own connection and
//! closes it when done; nothing is pooled.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let credentials = StarrocksCredentials::new("fe.internal", "analyst", "secret")
//!     .with_port(9030)
//!     .with_catalog("hive_catalog");
//! let client = StarrocksClient::new(credentials);
//!
//! let result = client.run_query("SELECT count(*) AS n FROM orders", None).await?;
//! let catalog = client
//!     .get_catalog(&[TableScope::new("hive_catalog", "sales", "orders")])
//!     .await?;
//! ```
//!
//! Reference: https://docs.starrocks.io/docs/sql-reference/information_schema/columns/

use crate::adapter::{TableScope, WarehouseClient, WarehouseError};
use crate::catalog::{CatalogBuilder, DEFAULT_INFORMATION_CATALOG};
use crate::dialect::{default_metric_sql, format_fraction, SqlDialect};
use crate::executor;
use crate::mysql::MySqlConnectionFactory;
use crate::session::{ConnectOptions, ConnectionFactory};
use quarry_core::{AdapterType, Catalog, ConfigError, Metric, MetricKind, QueryResult, Tags, WarehouseConfig};
use std::fmt;
use std::sync::Arc;

/// Default StarRocks FE query port
pub const DEFAULT_PORT: u16 = 9030;

/// StarRocks SQL dialect
///
/// Identifiers are left unquoted. Percentiles use the approximate
/// `APPROX_PERCENTILE` aggregate; every other metric uses the shared
/// translation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarrocksDialect;

impl SqlDialect for StarrocksDialect {
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Starrocks
    }

    fn identifier_quote_char(&self) -> &'static str {
        ""
    }

    fn string_quote_char(&self) -> &'static str {
        "'"
    }

    fn escaped_string_quote_char(&self) -> &'static str {
        "'"
    }

    fn quote_string_literal(&self, value: &str) -> String {
        // Backslash is an escape character in MySQL-family literals
        let escaped = value.replace('\\', "\\\\").replace('\'', "''");
        format!("'{}'", escaped)
    }

    fn metric_sql(&self, sql: &str, metric: &Metric) -> String {
        match metric.kind {
            MetricKind::Percentile => {
                format!("APPROX_PERCENTILE({}, {})", sql, format_fraction(metric.fraction()))
            }
            MetricKind::Median => format!("APPROX_PERCENTILE({}, 0.5)", sql),
            _ => default_metric_sql(sql, metric),
        }
    }
}

/// Connection parameters for a StarRocks frontend
#[derive(Clone, PartialEq, Eq)]
pub struct StarrocksCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,

    /// Catalog whose `information_schema` is queried for metadata
    pub catalog: Option<String>,

    /// Default schema for unqualified table names
    pub schema: Option<String>,
}

impl StarrocksCredentials {
    pub fn new(host: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            catalog: None,
            schema: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Read credentials from a `[warehouse]` config section
    pub fn from_config(config: &WarehouseConfig) -> Result<Self, ConfigError> {
        if config.warehouse_type != AdapterType::Starrocks {
            return Err(ConfigError::Invalid(format!(
                "Expected a starrocks warehouse, got '{}'",
                config.warehouse_type
            )));
        }

        let host = config.get_str("host")
            .ok_or_else(|| ConfigError::Invalid("StarRocks requires 'host' in warehouse settings".to_string()))?;
        let user = config.get_str("user")
            .ok_or_else(|| ConfigError::Invalid("StarRocks requires 'user' in warehouse settings".to_string()))?;
        let password = config.get_str("password").unwrap_or_default();

        let port = match config.get_int("port")? {
            Some(port) => u16::try_from(port)
                .map_err(|_| ConfigError::Invalid(format!("'port' out of range: {}", port)))?,
            None => DEFAULT_PORT,
        };

        let mut credentials = Self::new(host, user, password).with_port(port);
        if let Some(catalog) = config.get_str("catalog") {
            credentials = credentials.with_catalog(catalog);
        }
        if let Some(schema) = config.get_str("schema") {
            credentials = credentials.with_schema(schema);
        }

        Ok(credentials)
    }

    /// Options handed to the connection factory
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            user: self.user.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }

    /// Catalog holding the metadata views
    pub fn information_catalog(&self) -> &str {
        self.catalog.as_deref().unwrap_or(DEFAULT_INFORMATION_CATALOG)
    }
}

impl fmt::Debug for StarrocksCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StarrocksCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .finish()
    }
}

/// StarRocks implementation of [`WarehouseClient`]
pub struct StarrocksClient {
    credentials: StarrocksCredentials,
    factory: Arc<dyn ConnectionFactory>,
    dialect: Arc<StarrocksDialect>,
    catalog_builder: CatalogBuilder,
}

impl StarrocksClient {
    /// Create a client over the MySQL protocol transport
    pub fn new(credentials: StarrocksCredentials) -> Self {
        Self::with_factory(credentials, Arc::new(MySqlConnectionFactory::new()))
    }

    /// Create a client over any transport
    pub fn with_factory(credentials: StarrocksCredentials, factory: Arc<dyn ConnectionFactory>) -> Self {
        let dialect = Arc::new(StarrocksDialect);
        let catalog_builder = CatalogBuilder::new(
            Arc::clone(&factory),
            credentials.connect_options(),
            dialect.clone(),
        )
        .with_information_catalog(credentials.information_catalog());

        Self {
            credentials,
            factory,
            dialect,
            catalog_builder,
        }
    }

    pub fn credentials(&self) -> &StarrocksCredentials {
        &self.credentials
    }

    pub fn dialect(&self) -> &StarrocksDialect {
        &self.dialect
    }

    /// Scope for `table` in the configured catalog and schema
    pub fn default_scope(&self, table: impl Into<String>) -> Option<TableScope> {
        let schema = self.credentials.schema.as_ref()?;
        Some(TableScope::new(self.credentials.information_catalog(), schema.clone(), table))
    }
}

#[async_trait::async_trait]
impl WarehouseClient for StarrocksClient {
    async fn run_query(&self, sql: &str, tags: Option<&Tags>) -> Result<QueryResult, WarehouseError> {
        tracing::debug!(adapter = %self.adapter_type(), sql = %sql, "Running query");

        let factory = Arc::clone(&self.factory);
        let options = self.credentials.connect_options();
        let sql = sql.to_string();
        let tags = tags.cloned();

        // The task owns the session, so it is released even if this future is dropped
        tokio::spawn(async move {
            executor::run_statement(factory.as_ref(), &options, &sql, tags.as_ref()).await
        })
        .await
        .map_err(|e| WarehouseError::Query(format!("Query task failed: {}", e)))?
    }

    async fn get_catalog(&self, scopes: &[TableScope]) -> Result<Catalog, WarehouseError> {
        self.catalog_builder.build(scopes).await
    }

    fn identifier_quote_char(&self) -> &'static str {
        self.dialect.identifier_quote_char()
    }

    fn string_quote_char(&self) -> &'static str {
        self.dialect.string_quote_char()
    }

    fn escaped_string_quote_char(&self) -> &'static str {
        self.dialect.escaped_string_quote_char()
    }

    fn metric_sql(&self, sql: &str, metric: &Metric) -> String {
        self.dialect.metric_sql(sql, metric)
    }

    fn adapter_type(&self) -> AdapterType {
        self.dialect.adapter_type()
    }
}
