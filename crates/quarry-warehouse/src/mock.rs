//! Mock connection factory for testing
//!
//! This transport answers SQL from scripted results without connecting to
//! any warehouse. It's useful for:
//! - Unit testing clients and the catalog builder
//! - Verifying that every acquired session is released
//! - Demos and examples without real credentials
//! - Simulating connection, query and close failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quarry_warehouse::{MockConnectionFactory, StarrocksClient, StarrocksCredentials, TableScope};
//!
//! let mock = Arc::new(MockConnectionFactory::new());
//! mock.add_table(&TableScope::new("d", "s", "users"), None, &[("id", "bigint")]).await;
//!
//! let client = StarrocksClient::with_factory(credentials, mock.clone());
//! let catalog = client.get_catalog(&[TableScope::new("d", "s", "users")]).await?;
//! assert_eq!(mock.released(), mock.acquired());
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // Every connect fails
//! let mock = MockConnectionFactory::new().with_connection_failure("Access denied");
//!
//! // Slow queries
//! let mock = MockConnectionFactory::new().with_latency(100); // 100ms delay
//! ```

use crate::adapter::{TableScope, WarehouseError};
use crate::catalog::{columns_query, DEFAULT_INFORMATION_CATALOG};
use crate::session::{ConnectOptions, ConnectionFactory, RawColumn, RawResultSet, Session};
use crate::starrocks::StarrocksDialect;
use crate::type_mapping::NativeType;
use quarry_core::{Row, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Scripted answers shared by the factory and its sessions
#[derive(Default)]
struct MockState {
    /// Result sets by SQL text
    results: RwLock<HashMap<String, RawResultSet>>,

    /// Query errors by SQL text
    errors: RwLock<HashMap<String, String>>,

    /// Every statement received, in order
    queries: Mutex<Vec<String>>,

    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// In-memory [`ConnectionFactory`]
///
/// # Features
///
/// - Scripted result sets and errors per SQL text
/// - Ready-made `information_schema.columns` answers per table scope
/// - Trailing `-- ...` comment lines are ignored when matching, like a real engine
/// - Acquire/release counters and a log of received SQL
/// - Simulated connection failure, close failure and latency
pub struct MockConnectionFactory {
    state: Arc<MockState>,

    /// Error returned by every connect attempt
    connection_error: Option<String>,

    /// Make `close` fail (the session still counts as released)
    fail_close: bool,

    /// Simulated query latency (milliseconds)
    latency_ms: u64,
}

impl MockConnectionFactory {
    /// Create a mock with no scripted results
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState::default()),
            connection_error: None,
            fail_close: false,
            latency_ms: 0,
        }
    }

    /// Fail every connection attempt with `message`
    pub fn with_connection_failure(mut self, message: impl Into<String>) -> Self {
        self.connection_error = Some(message.into());
        self
    }

    /// Fail every session close
    pub fn with_close_failure(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Delay every query by `latency_ms` milliseconds
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Answer `sql` with the given columns and rows
    pub async fn add_result(&self, sql: impl Into<String>, columns: Vec<RawColumn>, rows: Vec<Row>) {
        self.state
            .results
            .write()
            .await
            .insert(sql.into(), RawResultSet { columns, rows });
    }

    /// Answer `sql` with a query error
    pub async fn add_error(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.state.errors.write().await.insert(sql.into(), message.into());
    }

    /// Answer the metadata query for `scope` with the given columns
    ///
    /// `columns` are `(column_name, data_type)` pairs in ordinal order.
    /// `reported_catalog` is the `table_catalog` value; `None` sends NULL.
    pub async fn add_table(
        &self,
        scope: &TableScope,
        reported_catalog: Option<&str>,
        columns: &[(&str, &str)],
    ) {
        self.add_table_in(DEFAULT_INFORMATION_CATALOG, scope, reported_catalog, columns)
            .await;
    }

    /// Like [`add_table`](Self::add_table), for a non-default information catalog
    pub async fn add_table_in(
        &self,
        information_catalog: &str,
        scope: &TableScope,
        reported_catalog: Option<&str>,
        columns: &[(&str, &str)],
    ) {
        let rows = columns
            .iter()
            .map(|(column, data_type)| {
                Row::new(vec![
                    (
                        "table_catalog".to_string(),
                        reported_catalog.map(Value::text).unwrap_or(Value::Null),
                    ),
                    ("table_schema".to_string(), Value::text(scope.schema.as_str())),
                    ("table_name".to_string(), Value::text(scope.table.as_str())),
                    ("column_name".to_string(), Value::text(*column)),
                    ("data_type".to_string(), Value::text(*data_type)),
                ])
            })
            .collect();

        let sql = columns_query(&StarrocksDialect, information_catalog, scope);
        self.add_result(sql, metadata_columns(), rows).await;
    }

    /// Fail the metadata query for `scope`
    pub async fn add_error_for_scope(&self, scope: &TableScope, message: impl Into<String>) {
        self.add_error_for_scope_in(DEFAULT_INFORMATION_CATALOG, scope, message)
            .await;
    }

    /// Like [`add_error_for_scope`](Self::add_error_for_scope), for a non-default information catalog
    pub async fn add_error_for_scope_in(
        &self,
        information_catalog: &str,
        scope: &TableScope,
        message: impl Into<String>,
    ) {
        let sql = columns_query(&StarrocksDialect, information_catalog, scope);
        self.add_error(sql, message).await;
    }

    /// Number of sessions opened
    pub fn acquired(&self) -> usize {
        self.state.acquired.load(Ordering::SeqCst)
    }

    /// Number of sessions closed
    pub fn released(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    /// Every statement received so far
    pub async fn queries(&self) -> Vec<String> {
        self.state.queries.lock().await.clone()
    }
}

impl Default for MockConnectionFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConnectionFactory for MockConnectionFactory {
    async fn connect(&self, _options: &ConnectOptions) -> Result<Box<dyn Session>, WarehouseError> {
        if let Some(message) = &self.connection_error {
            return Err(WarehouseError::Connection(message.clone()));
        }

        self.state.acquired.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
            fail_close: self.fail_close,
            latency_ms: self.latency_ms,
            closed: false,
        }))
    }
}

struct MockSession {
    state: Arc<MockState>,
    fail_close: bool,
    latency_ms: u64,
    closed: bool,
}

#[async_trait::async_trait]
impl Session for MockSession {
    async fn query(&mut self, sql: &str) -> Result<RawResultSet, WarehouseError> {
        if self.closed {
            return Err(WarehouseError::Query("Session already closed".to_string()));
        }

        self.state.queries.lock().await.push(sql.to_string());

        if self.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.latency_ms)).await;
        }

        let candidates = [sql, strip_trailing_comment(sql)];

        {
            let errors = self.state.errors.read().await;
            if let Some(message) = candidates.iter().find_map(|c| errors.get(*c)) {
                return Err(WarehouseError::Query(message.clone()));
            }
        }

        {
            let results = self.state.results.read().await;
            if let Some(result) = candidates.iter().find_map(|c| results.get(*c)) {
                return Ok(result.clone());
            }
        }

        if strip_trailing_comment(sql).trim().eq_ignore_ascii_case("SELECT 1") {
            return Ok(RawResultSet {
                columns: vec![RawColumn::new("1", NativeType::Long)],
                rows: vec![Row::new(vec![("1".to_string(), Value::Int(1))])],
            });
        }

        Err(WarehouseError::Query(format!("Unexpected statement: {}", sql)))
    }

    async fn close(&mut self) -> Result<(), WarehouseError> {
        if !self.closed {
            self.closed = true;
            self.state.released.fetch_add(1, Ordering::SeqCst);
        }

        if self.fail_close {
            return Err(WarehouseError::Connection("Simulated close failure".to_string()));
        }
        Ok(())
    }
}

/// Drop a final `-- ...` comment line
fn strip_trailing_comment(sql: &str) -> &str {
    match sql.rsplit_once('\n') {
        Some((body, last)) if last.trim_start().starts_with("--") => body,
        _ => sql,
    }
}

/// Result set columns of the metadata query
fn metadata_columns() -> Vec<RawColumn> {
    ["table_catalog", "table_schema", "table_name", "column_name", "data_type"]
        .into_iter()
        .map(|name| RawColumn::new(name, NativeType::VarString))
        .collect()
}
