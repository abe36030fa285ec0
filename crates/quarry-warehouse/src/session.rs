//! Connection sessions
//!
//! A session wraps exactly one physical connection. It is acquired at the
//! start of a single logical operation and released at its end, on every
//! exit path. Sessions are never pooled or shared between operations.

use crate::adapter::WarehouseError;
use crate::type_mapping::NativeType;
use quarry_core::Row;
use std::fmt;

/// Parameters for one physical connection
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl ConnectOptions {
    /// `host:port`, for logging
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Result set column as described by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: String,
    pub native_type: NativeType,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, native_type: NativeType) -> Self {
        Self {
            name: name.into(),
            native_type,
        }
    }
}

/// Unclassified result of one statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResultSet {
    pub columns: Vec<RawColumn>,
    pub rows: Vec<Row>,
}

/// One open connection, able to run SQL text
#[async_trait::async_trait]
pub trait Session: Send {
    /// Send a statement and collect its full result
    async fn query(&mut self, sql: &str) -> Result<RawResultSet, WarehouseError>;

    /// Close the underlying connection
    async fn close(&mut self) -> Result<(), WarehouseError>;
}

/// Opens sessions; the transport a warehouse client sits on
#[async_trait::async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Establish a new connection
    ///
    /// Failures must be reported as [`WarehouseError::Connection`].
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Session>, WarehouseError>;
}

/// Acquire a session for one operation
pub async fn acquire(
    factory: &dyn ConnectionFactory,
    options: &ConnectOptions,
) -> Result<Box<dyn Session>, WarehouseError> {
    tracing::debug!(address = %options.address(), user = %options.user, "Opening warehouse session");

    factory.connect(options).await.map_err(|e| match e {
        WarehouseError::Query(msg) => WarehouseError::Connection(msg),
        connection => connection,
    })
}

/// Release a session acquired with [`acquire`]
///
/// A close failure is logged and dropped so it never hides the outcome of
/// the operation that used the session.
pub async fn release(mut session: Box<dyn Session>) {
    match session.close().await {
        Ok(()) => tracing::debug!("Closed warehouse session"),
        Err(e) => tracing::warn!(error = %e, "Failed to close warehouse session"),
    }
}
