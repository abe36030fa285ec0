//! Query execution on a single session

use crate::adapter::WarehouseError;
use crate::session::{self, ConnectOptions, ConnectionFactory, RawColumn, Session};
use crate::type_mapping::classify_native_type;
use quarry_core::{FieldInfo, QueryResult, Tags};
use std::collections::BTreeMap;

/// Append tags to a statement as a trailing comment line
///
/// The tags are serialized as a JSON object. JSON escapes control
/// characters, so a tag value can never end the comment early.
pub fn annotate_sql(sql: &str, tags: Option<&Tags>) -> String {
    match tags {
        Some(tags) => {
            // A string map always serializes
            let json = serde_json::to_string(tags).unwrap_or_else(|_| "{}".to_string());
            format!("{}\n-- {}", sql, json)
        }
        None => sql.to_string(),
    }
}

/// Classify result set columns through the wire channel
pub fn convert_fields(columns: &[RawColumn]) -> BTreeMap<String, FieldInfo> {
    columns
        .iter()
        .map(|column| {
            (
                column.name.clone(),
                FieldInfo::new(classify_native_type(column.native_type)),
            )
        })
        .collect()
}

/// Run one statement on an open session
///
/// Any failure is a [`WarehouseError::Query`]; rows are only returned when
/// the whole statement succeeded.
pub async fn execute(
    session: &mut dyn Session,
    sql: &str,
    tags: Option<&Tags>,
) -> Result<QueryResult, WarehouseError> {
    let statement = annotate_sql(sql, tags);

    let raw = session.query(&statement).await.map_err(|e| match e {
        WarehouseError::Connection(msg) => WarehouseError::Query(msg),
        query => query,
    })?;

    Ok(QueryResult {
        fields: convert_fields(&raw.columns),
        rows: raw.rows,
    })
}

/// Open a session, run one statement, and release the session
///
/// The session is released exactly once whatever the statement's outcome.
pub async fn run_statement(
    factory: &dyn ConnectionFactory,
    options: &ConnectOptions,
    sql: &str,
    tags: Option<&Tags>,
) -> Result<QueryResult, WarehouseError> {
    let mut session = session::acquire(factory, options).await?;
    let outcome = execute(session.as_mut(), sql, tags).await;
    session::release(session).await;
    outcome
}
