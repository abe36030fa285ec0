//! Quarry Core
//!
//! Warehouse-independent domain model: logical types, the catalog shape,
//! query results, metric definitions and configuration.

pub mod schema;
pub mod result;
pub mod metric;
pub mod config;

pub use schema::{LogicalType, Catalog, CatalogSchemas, SchemaTables, TableColumns};
pub use result::{Value, Row, FieldInfo, QueryResult, Tags};
pub use metric::{Metric, MetricKind};
pub use config::{Config, ConfigError, WarehouseConfig, AdapterType, TomlValue};
