//! Catalog building from information_schema
//!
//! One metadata query is issued per [`TableScope`], each on its own session,
//! all concurrently. The returned rows are folded into a [`Catalog`] using the
//! text channel of the type mapper.

use crate::adapter::{TableScope, WarehouseError};
use crate::dialect::{quote_backtick, SqlDialect};
use crate::executor;
use crate::session::{ConnectOptions, ConnectionFactory};
use crate::type_mapping::classify_data_type;
use futures::stream::{FuturesUnordered, StreamExt};
use quarry_core::{Catalog, Row};
use std::sync::Arc;

/// Catalog holding `information_schema` when none is configured
pub const DEFAULT_INFORMATION_CATALOG: &str = "default_catalog";

/// Column metadata query for one scope
///
/// Schema and table are embedded as escaped string literals, the catalog as
/// a backtick-quoted identifier.
pub fn columns_query(dialect: &dyn SqlDialect, information_catalog: &str, scope: &TableScope) -> String {
    format!(
        "SELECT table_catalog, table_schema, table_name, column_name, data_type \
         FROM {}.information_schema.columns \
         WHERE table_schema = {} AND table_name = {} \
         ORDER BY table_catalog, table_schema, table_name, ordinal_position",
        quote_backtick(information_catalog),
        dialect.quote_string_literal(&scope.schema),
        dialect.quote_string_literal(&scope.table),
    )
}

/// Fold metadata rows for one scope into a catalog
///
/// The catalog name falls back to the scope's database when the engine
/// reports none.
pub fn fold_metadata_rows(
    catalog: &mut Catalog,
    scope: &TableScope,
    rows: &[Row],
) -> Result<(), WarehouseError> {
    for row in rows {
        let catalog_name = row
            .get_str("table_catalog")
            .filter(|name| !name.is_empty())
            .unwrap_or(scope.database.as_str());
        let schema = required(row, "table_schema", scope)?;
        let table = required(row, "table_name", scope)?;
        let column = required(row, "column_name", scope)?;
        let data_type = row.get_str("data_type").unwrap_or_default();

        catalog.insert_column(catalog_name, schema, table, column, classify_data_type(data_type));
    }

    Ok(())
}

fn required<'r>(row: &'r Row, column: &str, scope: &TableScope) -> Result<&'r str, WarehouseError> {
    row.get_str(column).ok_or_else(|| {
        WarehouseError::Query(format!(
            "Metadata row for {} has no {}",
            scope.fqn(),
            column
        ))
    })
}

/// Builds catalogs through a connection factory
pub struct CatalogBuilder {
    factory: Arc<dyn ConnectionFactory>,
    options: ConnectOptions,
    dialect: Arc<dyn SqlDialect>,
    information_catalog: String,
}

impl CatalogBuilder {
    pub fn new(
        factory: Arc<dyn ConnectionFactory>,
        options: ConnectOptions,
        dialect: Arc<dyn SqlDialect>,
    ) -> Self {
        Self {
            factory,
            options,
            dialect,
            information_catalog: DEFAULT_INFORMATION_CATALOG.to_string(),
        }
    }

    /// Query `information_schema` inside another catalog
    pub fn with_information_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.information_catalog = catalog.into();
        self
    }

    pub fn information_catalog(&self) -> &str {
        &self.information_catalog
    }

    /// Build a catalog covering every scope
    ///
    /// An empty scope list returns an empty catalog without connecting. The
    /// first scope to fail fails the whole build with a
    /// [`WarehouseError::Query`]; scopes still in flight run to completion in
    /// the background so their sessions are released, and are discarded.
    pub async fn build(&self, scopes: &[TableScope]) -> Result<Catalog, WarehouseError> {
        if scopes.is_empty() {
            return Ok(Catalog::new());
        }

        let mut tasks = FuturesUnordered::new();

        for scope in scopes {
            let factory = Arc::clone(&self.factory);
            let options = self.options.clone();
            let sql = columns_query(self.dialect.as_ref(), &self.information_catalog, scope);
            let scope = scope.clone();

            tasks.push(tokio::spawn(async move {
                tracing::debug!(scope = %scope, "Fetching column metadata");

                let result = executor::run_statement(factory.as_ref(), &options, &sql, None).await?;

                let mut partial = Catalog::new();
                fold_metadata_rows(&mut partial, &scope, &result.rows)?;
                Ok::<_, WarehouseError>(partial)
            }));
        }

        let mut catalog = Catalog::new();

        while let Some(joined) = tasks.next().await {
            let partial = joined
                .map_err(|e| WarehouseError::Query(format!("Metadata task failed: {}", e)))?
                .map_err(|e| WarehouseError::Query(e.message().to_string()))?;
            catalog.merge(partial);
        }

        tracing::debug!(
            scopes = scopes.len(),
            columns = catalog.column_count(),
            "Built warehouse catalog"
        );

        Ok(catalog)
    }
}
