//! Native type classification
//!
//! Two independent channels map StarRocks types to [`LogicalType`]:
//!
//! - the wire channel, keyed on the MySQL protocol column type code that
//!   accompanies every result set
//! - the text channel, keyed on the `data_type` strings of
//!   `information_schema.columns`
//!
//! Both are total: anything unrecognized is a `String`. They are allowed to
//! disagree (a wire `TIME` is a timestamp, a textual `time` is not) and are
//! never cross-checked.
//!
//! Reference: https://dev.mysql.com/doc/dev/mysql-server/latest/field__types_8h.html

use quarry_core::LogicalType;

/// MySQL protocol column type, as reported in result set metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Decimal,
    Tiny,
    Short,
    Long,
    Float,
    Double,
    Null,
    Timestamp,
    LongLong,
    Int24,
    Date,
    Time,
    DateTime,
    Year,
    NewDate,
    VarChar,
    Bit,
    Timestamp2,
    DateTime2,
    Time2,
    Json,
    NewDecimal,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    VarString,
    String,
    Geometry,
    /// A code this mapper does not know
    Unknown(u8),
}

impl NativeType {
    /// Decode a protocol type code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Decimal,
            1 => Self::Tiny,
            2 => Self::Short,
            3 => Self::Long,
            4 => Self::Float,
            5 => Self::Double,
            6 => Self::Null,
            7 => Self::Timestamp,
            8 => Self::LongLong,
            9 => Self::Int24,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::DateTime,
            13 => Self::Year,
            14 => Self::NewDate,
            15 => Self::VarChar,
            16 => Self::Bit,
            17 => Self::Timestamp2,
            18 => Self::DateTime2,
            19 => Self::Time2,
            245 => Self::Json,
            246 => Self::NewDecimal,
            247 => Self::Enum,
            248 => Self::Set,
            249 => Self::TinyBlob,
            250 => Self::MediumBlob,
            251 => Self::LongBlob,
            252 => Self::Blob,
            253 => Self::VarString,
            254 => Self::String,
            255 => Self::Geometry,
            other => Self::Unknown(other),
        }
    }

    /// Protocol type code
    pub fn code(&self) -> u8 {
        match self {
            Self::Decimal => 0,
            Self::Tiny => 1,
            Self::Short => 2,
            Self::Long => 3,
            Self::Float => 4,
            Self::Double => 5,
            Self::Null => 6,
            Self::Timestamp => 7,
            Self::LongLong => 8,
            Self::Int24 => 9,
            Self::Date => 10,
            Self::Time => 11,
            Self::DateTime => 12,
            Self::Year => 13,
            Self::NewDate => 14,
            Self::VarChar => 15,
            Self::Bit => 16,
            Self::Timestamp2 => 17,
            Self::DateTime2 => 18,
            Self::Time2 => 19,
            Self::Json => 245,
            Self::NewDecimal => 246,
            Self::Enum => 247,
            Self::Set => 248,
            Self::TinyBlob => 249,
            Self::MediumBlob => 250,
            Self::LongBlob => 251,
            Self::Blob => 252,
            Self::VarString => 253,
            Self::String => 254,
            Self::Geometry => 255,
            Self::Unknown(code) => *code,
        }
    }
}

/// Classify a result set column by its protocol type
pub fn classify_native_type(native: NativeType) -> LogicalType {
    match native {
        NativeType::Bit => LogicalType::Boolean,

        NativeType::Tiny
        | NativeType::Short
        | NativeType::Long
        | NativeType::Int24
        | NativeType::LongLong
        | NativeType::Float
        | NativeType::Double
        | NativeType::Decimal
        | NativeType::NewDecimal
        | NativeType::Year => LogicalType::Number,

        NativeType::Date | NativeType::NewDate => LogicalType::Date,

        NativeType::Timestamp
        | NativeType::Timestamp2
        | NativeType::DateTime
        | NativeType::DateTime2
        | NativeType::Time
        | NativeType::Time2 => LogicalType::Timestamp,

        _ => LogicalType::String,
    }
}

/// Drop a parenthesized size/precision suffix and normalize case
///
/// `decimal(10, 2)` and `DATETIME(3)` become `decimal` and `datetime`.
/// Applying it twice gives the same result as applying it once.
pub fn strip_type_precision(data_type: &str) -> String {
    data_type
        .split('(')
        .next()
        .unwrap_or(data_type)
        .trim()
        .to_lowercase()
}

/// Classify an `information_schema.columns.data_type` string
pub fn classify_data_type(data_type: &str) -> LogicalType {
    match strip_type_precision(data_type).as_str() {
        "boolean" | "bool" => LogicalType::Boolean,

        // Integer types
        "tinyint" | "smallint" | "int" | "integer" | "bigint" | "largeint" => LogicalType::Number,

        // Floating point and decimal types
        "real" | "float" | "double" => LogicalType::Number,
        "decimal" | "decimalv2" | "decimal32" | "decimal64" | "decimal128" => LogicalType::Number,

        "date" => LogicalType::Date,

        "datetime" | "timestamp" | "timestamp with time zone" => LogicalType::Timestamp,

        // char, varchar, string, json, binary, time, array<..>, map<..>, struct<..>
        _ => LogicalType::String,
    }
}
