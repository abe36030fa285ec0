//! Warehouse clients for running SQL and reading column catalogs
//!
//! A client sends SQL to a warehouse on a short-lived session, converts the
//! rows and column types into [`quarry_core::QueryResult`], and builds
//! [`quarry_core::Catalog`]s from `information_schema`.
//!
//! ## Features
//!
//! Enable warehouse support via Cargo features:
//! - `starrocks` - StarRocks over the MySQL wire protocol
//! - `all-warehouses` - All warehouse transports
//!
//! Without a feature the clients still build; connecting returns a
//! [`WarehouseError::Connection`] naming the missing feature. The
//! [`MockConnectionFactory`] works in every build.
//!
//! ## Example
//!
//! ```rust,ignore
//! use quarry_warehouse::{StarrocksClient, StarrocksCredentials, TableScope, WarehouseClient};
//!
//! let client = StarrocksClient::new(StarrocksCredentials::new("fe.internal", "analyst", "secret"));
//! let result = client.run_query("SELECT 1 AS one", None).await?;
//! let catalog = client.get_catalog(&[TableScope::new("default_catalog", "sales", "orders")]).await?;
//! ```

pub mod adapter;
pub mod catalog;
pub mod dialect;
pub mod executor;
pub mod mock;
pub mod mysql;
pub mod session;
pub mod starrocks;
pub mod type_mapping;

pub use adapter::{TableScope, WarehouseClient, WarehouseError};
pub use catalog::{CatalogBuilder, DEFAULT_INFORMATION_CATALOG};
pub use dialect::{default_metric_sql, SqlDialect};
pub use mock::MockConnectionFactory;
pub use mysql::MySqlConnectionFactory;
pub use session::{ConnectOptions, ConnectionFactory, RawColumn, RawResultSet, Session};
pub use starrocks::{StarrocksClient, StarrocksCredentials, StarrocksDialect};
pub use type_mapping::{classify_data_type, classify_native_type, NativeType};

use quarry_core::{ConfigError, WarehouseConfig};

/// Build a client for the configured warehouse type
pub fn client_from_config(config: &WarehouseConfig) -> Result<Box<dyn WarehouseClient>, ConfigError> {
    match config.warehouse_type {
        quarry_core::AdapterType::Starrocks => {
            let credentials = StarrocksCredentials::from_config(config)?;
            Ok(Box::new(StarrocksClient::new(credentials)))
        }
    }
}
