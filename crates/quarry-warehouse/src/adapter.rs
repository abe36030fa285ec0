//! Warehouse client trait consumed by the query-building layer

use quarry_core::{AdapterType, Catalog, Metric, QueryResult, Tags};
use std::fmt;

/// Identifies one metadata query target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableScope {
    /// Database/catalog name, used when the engine reports no catalog
    pub database: String,

    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableScope {
    /// Create a new table scope
    pub fn new(database: impl Into<String>, schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.table)
    }
}

impl fmt::Display for TableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

impl std::str::FromStr for TableScope {
    type Err = String;

    /// Parse `database.schema.table`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [database, schema, table]
                if !database.is_empty() && !schema.is_empty() && !table.is_empty() =>
            {
                Ok(Self::new(*database, *schema, *table))
            }
            _ => Err(format!(
                "Invalid table scope '{}': expected database.schema.table",
                s
            )),
        }
    }
}

/// Errors surfaced by a warehouse client
///
/// Both kinds are terminal for the operation that raised them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WarehouseError {
    /// A session could not be established
    #[error("Connection failed: {0}")]
    Connection(String),

    /// SQL execution or metadata retrieval failed
    #[error("Query failed: {0}")]
    Query(String),
}

impl WarehouseError {
    /// The underlying transport or engine message
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(msg) | Self::Query(msg) => msg,
        }
    }
}

/// Uniform interface over a SQL warehouse
///
/// One implementation per dialect. Query-building code upstream only talks
/// to this trait.
#[async_trait::async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Run a SQL statement, optionally annotated with tags
    ///
    /// Tags are appended as a trailing comment and never change the result.
    async fn run_query(&self, sql: &str, tags: Option<&Tags>) -> Result<QueryResult, WarehouseError>;

    /// Fetch column metadata for every scope
    ///
    /// Either the union of all scopes is returned, or the first failure.
    async fn get_catalog(&self, scopes: &[TableScope]) -> Result<Catalog, WarehouseError>;

    /// Test the connection to the warehouse
    async fn test_connection(&self) -> Result<(), WarehouseError> {
        self.run_query("SELECT 1", None).await.map(|_| ())
    }

    /// Character used to quote identifiers (may be empty)
    fn identifier_quote_char(&self) -> &'static str;

    /// Character used to delimit string literals
    fn string_quote_char(&self) -> &'static str;

    /// Character used to escape a string quote inside a literal
    fn escaped_string_quote_char(&self) -> &'static str;

    /// Translate a logical metric into a SQL fragment
    fn metric_sql(&self, sql: &str, metric: &Metric) -> String;

    /// Which SQL dialect this client speaks
    fn adapter_type(&self) -> AdapterType;
}
