//! Bind parameters and value conversion at the engine boundary.

use duckdb::types::{ToSqlOutput, Value, ValueRef};
use serde_json::Value as JsonValue;

/// A value that can be bound to a `?` placeholder in a statement.
///
/// Only scalar types cross this boundary; everything else travels as SQL
/// text assembled by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// Text value.
    Text(String),
}

impl duckdb::ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Boolean(*b),
            Self::Int(i) => Value::BigInt(*i),
            Self::Float(f) => Value::Double(*f),
            Self::Text(s) => Value::Text(s.clone()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for SqlValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Convert an owned DuckDB value to JSON.
pub fn engine_value_to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::TinyInt(i) => JsonValue::Number(i.into()),
        Value::SmallInt(i) => JsonValue::Number(i.into()),
        Value::Int(i) => JsonValue::Number(i.into()),
        Value::BigInt(i) => JsonValue::Number(i.into()),
        // i128 does not fit in a JSON number; carry it as text
        Value::HugeInt(i) => JsonValue::String(i.to_string()),
        Value::UTinyInt(i) => JsonValue::Number(i.into()),
        Value::USmallInt(i) => JsonValue::Number(i.into()),
        Value::UInt(i) => JsonValue::Number(i.into()),
        Value::UBigInt(i) => JsonValue::Number(i.into()),
        Value::Float(f) => float_to_json(f64::from(f)),
        Value::Double(f) => float_to_json(f),
        // Decimals stay textual to preserve precision
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::Text(s) => JsonValue::String(s),
        Value::Blob(bytes) => JsonValue::String(hex_encode(&bytes)),
        Value::Date32(days) => date32_to_json(days),
        Value::Time64(..) | Value::Timestamp(..) | Value::Interval { .. } => {
            JsonValue::String(format!("{:?}", value))
        }
        Value::List(items) => {
            JsonValue::Array(items.into_iter().map(engine_value_to_json).collect())
        }
        Value::Enum(e) => JsonValue::String(e),
        Value::Struct(fields) => {
            let obj: serde_json::Map<String, JsonValue> = fields
                .iter()
                .map(|(k, v)| (k.clone(), engine_value_to_json(v.clone())))
                .collect();
            JsonValue::Object(obj)
        }
        Value::Array(items) => {
            JsonValue::Array(items.into_iter().map(engine_value_to_json).collect())
        }
        Value::Map(map) => {
            let obj: serde_json::Map<String, JsonValue> = map
                .iter()
                .map(|(k, v)| (format!("{:?}", k), engine_value_to_json(v.clone())))
                .collect();
            JsonValue::Object(obj)
        }
        Value::Union(inner) => engine_value_to_json(*inner),
    }
}

/// Convert a borrowed DuckDB value to JSON.
///
/// Complex values (lists, structs, maps) are converted through the owned
/// representation.
pub fn engine_value_ref_to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Boolean(b) => JsonValue::Bool(b),
        ValueRef::TinyInt(i) => JsonValue::Number(i.into()),
        ValueRef::SmallInt(i) => JsonValue::Number(i.into()),
        ValueRef::Int(i) => JsonValue::Number(i.into()),
        ValueRef::BigInt(i) => JsonValue::Number(i.into()),
        ValueRef::HugeInt(i) => JsonValue::String(i.to_string()),
        ValueRef::UTinyInt(i) => JsonValue::Number(i.into()),
        ValueRef::USmallInt(i) => JsonValue::Number(i.into()),
        ValueRef::UInt(i) => JsonValue::Number(i.into()),
        ValueRef::UBigInt(i) => JsonValue::Number(i.into()),
        ValueRef::Float(f) => float_to_json(f64::from(f)),
        ValueRef::Double(f) => float_to_json(f),
        ValueRef::Decimal(d) => JsonValue::String(d.to_string()),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => JsonValue::String(hex_encode(bytes)),
        ValueRef::Date32(days) => date32_to_json(days),
        ValueRef::Time64(..) | ValueRef::Timestamp(..) | ValueRef::Interval { .. } => {
            JsonValue::String(format!("{:?}", value))
        }
        ValueRef::List(..)
        | ValueRef::Enum(..)
        | ValueRef::Struct(..)
        | ValueRef::Array(..)
        | ValueRef::Map(..)
        | ValueRef::Union(..) => engine_value_to_json(value.to_owned()),
    }
}

fn float_to_json(f: f64) -> JsonValue {
    serde_json::Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

// DuckDB Date32 counts days since the Unix epoch; chrono's day count starts
// at 0001-01-01, offset by 719163 days.
fn date32_to_json(days: i32) -> JsonValue {
    match chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163) {
        Some(d) => JsonValue::String(d.to_string()),
        None => JsonValue::Null,
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
