//! Logical types and the warehouse catalog

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Portable logical type system
///
/// Every warehouse-native column type maps to exactly one of these.
/// Anything a dialect does not recognize is a `String`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    /// Boolean type
    Boolean,

    /// Any numeric type (integer, float or decimal)
    Number,

    /// Date (no time component)
    Date,

    /// Timestamp (with time component)
    Timestamp,

    /// String/text type, and the fallback for unrecognized types
    #[default]
    String,
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Number => write!(f, "NUMBER"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::String => write!(f, "STRING"),
        }
    }
}

/// Columns of one table, by column name
pub type TableColumns = BTreeMap<String, LogicalType>;

/// Tables of one schema, by table name
pub type SchemaTables = BTreeMap<String, TableColumns>;

/// Schemas of one catalog, by schema name
pub type CatalogSchemas = BTreeMap<String, SchemaTables>;

/// Warehouse metadata: catalog -> schema -> table -> column -> logical type
///
/// Keys are case-sensitive. A catalog is built fresh for every request and
/// serializes as a plain nested object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    catalogs: BTreeMap<String, CatalogSchemas>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a column, creating the catalog, schema and table branches as needed
    ///
    /// A column that is already present is overwritten.
    pub fn insert_column(
        &mut self,
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        logical_type: LogicalType,
    ) {
        self.catalogs
            .entry(catalog.into())
            .or_default()
            .entry(schema.into())
            .or_default()
            .entry(table.into())
            .or_default()
            .insert(column.into(), logical_type);
    }

    /// Union another catalog into this one
    pub fn merge(&mut self, other: Catalog) {
        for (catalog, schemas) in other.catalogs {
            for (schema, tables) in schemas {
                for (table, columns) in tables {
                    for (column, logical_type) in columns {
                        self.insert_column(
                            catalog.clone(),
                            schema.clone(),
                            table.clone(),
                            column,
                            logical_type,
                        );
                    }
                }
            }
        }
    }

    /// Look up the type of a single column
    pub fn column_type(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Option<LogicalType> {
        self.table(catalog, schema, table)?.get(column).copied()
    }

    /// Look up the columns of a table
    pub fn table(&self, catalog: &str, schema: &str, table: &str) -> Option<&TableColumns> {
        self.catalogs.get(catalog)?.get(schema)?.get(table)
    }

    /// Look up all schemas of a catalog
    pub fn schemas(&self, catalog: &str) -> Option<&CatalogSchemas> {
        self.catalogs.get(catalog)
    }

    /// Top-level catalog names, sorted
    pub fn catalog_names(&self) -> Vec<&str> {
        self.catalogs.keys().map(|k| k.as_str()).collect()
    }

    /// Iterate over catalogs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CatalogSchemas)> {
        self.catalogs.iter()
    }

    /// Total number of columns across every table
    pub fn column_count(&self) -> usize {
        self.catalogs
            .values()
            .flat_map(|schemas| schemas.values())
            .flat_map(|tables| tables.values())
            .map(|columns| columns.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}
