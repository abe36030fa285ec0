//! MySQL wire protocol transport
//!
//! Opens one unpooled `mysql_async` connection per session and disconnects
//! it on close. Results are read with the text protocol; cells keep the
//! value model of the driver.
//!
//! Requires the `starrocks` feature:
//!
//! ```bash
//! cargo build --features starrocks
//! ```

use crate::adapter::WarehouseError;
use crate::session::{ConnectOptions, ConnectionFactory, Session};

#[cfg(feature = "starrocks")]
use crate::session::{RawColumn, RawResultSet};

#[cfg(feature = "starrocks")]
use crate::type_mapping::NativeType;

#[cfg(feature = "starrocks")]
use mysql_async::prelude::Queryable;

#[cfg(feature = "starrocks")]
use quarry_core::{Row, Value};

/// Connection factory for MySQL-protocol engines
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnectionFactory;

impl MySqlConnectionFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ConnectionFactory for MySqlConnectionFactory {
    #[cfg(feature = "starrocks")]
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Session>, WarehouseError> {
        let opts = mysql_async::OptsBuilder::default()
            .ip_or_hostname(options.host.clone())
            .tcp_port(options.port)
            .user(Some(options.user.clone()))
            .pass(Some(options.password.clone()))
            .prefer_socket(false);

        let conn = mysql_async::Conn::new(opts)
            .await
            .map_err(|e| WarehouseError::Connection(e.to_string()))?;

        Ok(Box::new(MySqlSession { conn: Some(conn) }))
    }

    #[cfg(not(feature = "starrocks"))]
    async fn connect(&self, _options: &ConnectOptions) -> Result<Box<dyn Session>, WarehouseError> {
        Err(WarehouseError::Connection(
            "StarRocks support not compiled. Rebuild with: cargo build --features starrocks".to_string()
        ))
    }
}

/// A single open MySQL-protocol connection
#[cfg(feature = "starrocks")]
pub struct MySqlSession {
    conn: Option<mysql_async::Conn>,
}

#[cfg(feature = "starrocks")]
#[async_trait::async_trait]
impl Session for MySqlSession {
    async fn query(&mut self, sql: &str) -> Result<RawResultSet, WarehouseError> {
        let conn = self.conn.as_mut()
            .ok_or_else(|| WarehouseError::Query("Session already closed".to_string()))?;

        let mut result = conn.query_iter(sql).await.map_err(query_error)?;

        let columns = result
            .columns()
            .map(|columns| {
                columns
                    .iter()
                    .map(|column| {
                        RawColumn::new(
                            column.name_str().into_owned(),
                            NativeType::from_code(column.column_type() as u8),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<mysql_async::Row> = result.collect().await.map_err(query_error)?;
        result.drop_result().await.map_err(query_error)?;

        Ok(RawResultSet {
            columns,
            rows: rows.into_iter().map(convert_row).collect(),
        })
    }

    async fn close(&mut self) -> Result<(), WarehouseError> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect()
                .await
                .map_err(|e| WarehouseError::Connection(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(feature = "starrocks")]
fn query_error(e: mysql_async::Error) -> WarehouseError {
    match e {
        // Keep the engine's own message without the driver's prefix
        mysql_async::Error::Server(server) => WarehouseError::Query(server.message),
        other => WarehouseError::Query(other.to_string()),
    }
}

#[cfg(feature = "starrocks")]
fn convert_row(row: mysql_async::Row) -> Row {
    let names: Vec<String> = row
        .columns_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect();

    names
        .into_iter()
        .zip(row.unwrap_raw())
        .map(|(name, value)| (name, value.map(convert_value).unwrap_or(Value::Null)))
        .collect()
}

#[cfg(feature = "starrocks")]
fn convert_value(value: mysql_async::Value) -> Value {
    match value {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => Value::Bytes(bytes),
        mysql_async::Value::Int(i) => Value::Int(i),
        mysql_async::Value::UInt(u) => Value::UInt(u),
        mysql_async::Value::Float(f) => Value::Float(f),
        mysql_async::Value::Double(d) => Value::Double(d),
        mysql_async::Value::Date(year, month, day, hour, minute, second, micro) => Value::Date {
            year,
            month,
            day,
            hour,
            minute,
            second,
            micro,
        },
        mysql_async::Value::Time(negative, days, hours, minutes, seconds, micros) => Value::Time {
            negative,
            days,
            hours,
            minutes,
            seconds,
            micros,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "starrocks"))]
    #[tokio::test]
    async fn test_connect_without_feature() {
        let options = ConnectOptions {
            user: "root".to_string(),
            password: String::new(),
            host: "localhost".to_string(),
            port: 9030,
        };

        let result = MySqlConnectionFactory::new().connect(&options).await;
        assert!(matches!(result, Err(WarehouseError::Connection(msg)) if msg.contains("--features starrocks")));
    }

    #[cfg(feature = "starrocks")]
    #[test]
    fn test_convert_value() {
        assert_eq!(convert_value(mysql_async::Value::NULL), Value::Null);
        assert_eq!(convert_value(mysql_async::Value::Int(-3)), Value::Int(-3));
        assert_eq!(convert_value(mysql_async::Value::Bytes(b"abc".to_vec())), Value::text("abc"));
        assert_eq!(
            convert_value(mysql_async::Value::Date(2024, 2, 29, 13, 5, 0, 0)),
            Value::Date { year: 2024, month: 2, day: 29, hour: 13, minute: 5, second: 0, micro: 0 }
        );
    }

    #[cfg(feature = "starrocks")]
    #[test]
    fn test_column_type_codes_match_protocol() {
        use mysql_async::consts::ColumnType;

        assert_eq!(NativeType::from_code(ColumnType::MYSQL_TYPE_BIT as u8), NativeType::Bit);
        assert_eq!(NativeType::from_code(ColumnType::MYSQL_TYPE_LONGLONG as u8), NativeType::LongLong);
        assert_eq!(NativeType::from_code(ColumnType::MYSQL_TYPE_NEWDECIMAL as u8), NativeType::NewDecimal);
        assert_eq!(NativeType::from_code(ColumnType::MYSQL_TYPE_VAR_STRING as u8), NativeType::VarString);
        assert_eq!(NativeType::from_code(ColumnType::MYSQL_TYPE_DATETIME as u8), NativeType::DateTime);
    }

    #[cfg(feature = "starrocks")]
    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        let options = ConnectOptions {
            user: "root".to_string(),
            password: String::new(),
            host: "127.0.0.1".to_string(),
            port: 1,
        };

        let result = MySqlConnectionFactory::new().connect(&options).await;
        assert!(matches!(result, Err(WarehouseError::Connection(_))));
    }
}
