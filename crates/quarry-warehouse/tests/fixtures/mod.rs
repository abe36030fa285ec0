//! Test fixtures for warehouse client integration tests
//!
//! Column lists are `(column_name, data_type)` pairs as StarRocks reports
//! them in `information_schema.columns`, in ordinal order.

use quarry_core::{Row, Value};
use quarry_warehouse::{NativeType, RawColumn, StarrocksCredentials};

/// A typical users table
///
/// - Primary key (id)
/// - Contact information (email, name)
/// - Metadata (created_at, is_active)
pub fn users_columns() -> Vec<(&'static str, &'static str)> {
    vec![
        ("id", "bigint"),
        ("email", "varchar(255)"),
        ("name", "varchar(128)"),
        ("created_at", "datetime"),
        ("is_active", "boolean"),
    ]
}

/// A typical e-commerce orders table
pub fn orders_columns() -> Vec<(&'static str, &'static str)> {
    vec![
        ("id", "bigint"),
        ("user_id", "bigint"),
        ("total_amount", "decimal(10,2)"),
        ("status", "varchar(32)"),
        ("order_date", "date"),
    ]
}

/// A table exercising every logical type bucket
pub fn all_types_columns() -> Vec<(&'static str, &'static str)> {
    vec![
        ("flag", "boolean"),
        ("tiny", "tinyint"),
        ("small", "smallint"),
        ("regular", "int"),
        ("big", "bigint"),
        ("huge", "largeint"),
        ("ratio", "double"),
        ("price", "decimal128(38,9)"),
        ("day", "date"),
        ("moment", "datetime"),
        ("label", "varchar(64)"),
        ("code", "char(8)"),
        ("payload", "json"),
        ("tags", "array<varchar(16)>"),
    ]
}

/// Columns of a two-column `SELECT id, name` result
pub fn id_name_columns() -> Vec<RawColumn> {
    vec![
        RawColumn::new("id", NativeType::LongLong),
        RawColumn::new("name", NativeType::VarString),
    ]
}

/// One `(id, name)` row
pub fn id_name_row(id: i64, name: &str) -> Row {
    Row::new(vec![
        ("id".to_string(), Value::Int(id)),
        ("name".to_string(), Value::text(name)),
    ])
}

/// Credentials that never reach a real frontend
pub fn test_credentials() -> StarrocksCredentials {
    StarrocksCredentials::new("fe.test", "root", "secret")
}
