//! Dynamic SQL values and the conversions between them and entity fields.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::SqlType;

/// A dynamically-typed SQL value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    BigInt(i64),
    /// Double precision float
    Double(f64),
    /// Exact decimal carried as its textual form
    Decimal(String),
    /// Text
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Native UUID
    Uuid(Uuid),
    /// Microseconds since the Unix epoch
    Timestamp(i64),
    /// JSON document
    Json(serde_json::Value),
}

impl Value {
    /// True if this value is SQL NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in conversion errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BLOB",
            Value::Uuid(_) => "UUID",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::Json(_) => "JSON",
        }
    }

    /// Integer view of the value, if it is integral.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::BigInt(v) | Value::Timestamp(v) => Some(*v),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Text(s) | Value::Decimal(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String view of textual values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a textual sentinel (e.g. a soft-delete marker) into a value of `ty`.
    ///
    /// Integer-typed fields get an integer when the text parses as one; every
    /// other combination keeps the text.
    #[must_use]
    pub fn from_sentinel(sentinel: &str, ty: SqlType) -> Self {
        match ty {
            SqlType::Integer => sentinel
                .parse::<i32>()
                .map_or_else(|_| Value::Text(sentinel.to_string()), Value::Int),
            SqlType::BigInt => sentinel
                .parse::<i64>()
                .map_or_else(|_| Value::Text(sentinel.to_string()), Value::BigInt),
            SqlType::Boolean => match sentinel {
                "1" | "true" | "TRUE" => Value::Bool(true),
                "0" | "false" | "FALSE" => Value::Bool(false),
                _ => Value::Text(sentinel.to_string()),
            },
            _ => Value::Text(sentinel.to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion between an entity field's Rust type and [`Value`].
///
/// `SQL_TYPE` is the declared property type used by the resolver; it decides, for
/// example, whether a generated UUID is stored as text or as a native UUID.
pub trait FieldValue: Sized {
    /// Declared property type of this Rust type.
    const SQL_TYPE: SqlType;

    /// Current value of the field.
    fn to_value(&self) -> Value;

    /// Build the field from a value. `field` names the field in errors.
    fn from_value(value: Value, field: &str) -> Result<Self>;
}

fn mismatch<T>(field: &str, expected: &'static str, found: &Value) -> Result<T> {
    Err(Error::conversion(field, expected, found.type_name()))
}

impl FieldValue for bool {
    const SQL_TYPE: SqlType = SqlType::Boolean;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(i) => Ok(i != 0),
            Value::BigInt(i) => Ok(i != 0),
            other => mismatch(field, "BOOLEAN", &other),
        }
    }
}

impl FieldValue for i32 {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            Value::BigInt(i) => i32::try_from(i)
                .map_err(|_| Error::conversion(field, "INTEGER", format!("out-of-range {i}"))),
            Value::Bool(b) => Ok(i32::from(b)),
            Value::Text(ref s) => s.trim().parse().or_else(|_| mismatch(field, "INTEGER", &value)),
            other => mismatch(field, "INTEGER", &other),
        }
    }
}

impl FieldValue for i64 {
    const SQL_TYPE: SqlType = SqlType::BigInt;

    fn to_value(&self) -> Value {
        Value::BigInt(*self)
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value.as_i64() {
            Some(i) => Ok(i),
            None => mismatch(field, "BIGINT", &value),
        }
    }
}

impl FieldValue for f64 {
    const SQL_TYPE: SqlType = SqlType::Double;

    fn to_value(&self) -> Value {
        Value::Double(*self)
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Double(f) => Ok(f),
            Value::Int(i) => Ok(f64::from(i)),
            Value::BigInt(i) => Ok(i as f64),
            Value::Decimal(ref s) | Value::Text(ref s) => {
                s.trim().parse().or_else(|_| mismatch(field, "DOUBLE", &value))
            }
            other => mismatch(field, "DOUBLE", &other),
        }
    }
}

impl FieldValue for String {
    const SQL_TYPE: SqlType = SqlType::Varchar;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Text(s) | Value::Decimal(s) => Ok(s),
            Value::Uuid(u) => Ok(u.hyphenated().to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::BigInt(i) => Ok(i.to_string()),
            other => mismatch(field, "TEXT", &other),
        }
    }
}

impl FieldValue for Vec<u8> {
    const SQL_TYPE: SqlType = SqlType::Blob;

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => mismatch(field, "BLOB", &other),
        }
    }
}

impl FieldValue for Uuid {
    const SQL_TYPE: SqlType = SqlType::Uuid;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::Text(ref s) => Uuid::parse_str(s).or_else(|_| mismatch(field, "UUID", &value)),
            Value::Bytes(ref b) => Uuid::from_slice(b).or_else(|_| mismatch(field, "UUID", &value)),
            other => mismatch(field, "UUID", &other),
        }
    }
}

impl FieldValue for serde_json::Value {
    const SQL_TYPE: SqlType = SqlType::Json;

    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Json(j) => Ok(j),
            Value::Text(ref s) => {
                serde_json::from_str(s).or_else(|_| mismatch(field, "JSON", &value))
            }
            other => mismatch(field, "JSON", &other),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn from_value(value: Value, field: &str) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value, field).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_null_both_ways() {
        let none: Option<i64> = None;
        assert!(none.to_value().is_null());
        assert_eq!(
            <Option<i64>>::from_value(Value::Null, "id").unwrap(),
            None
        );
        assert_eq!(
            <Option<i64>>::from_value(Value::Int(7), "id").unwrap(),
            Some(7)
        );
    }

    #[test]
    fn i32_rejects_out_of_range_bigint() {
        let err = i32::from_value(Value::BigInt(i64::MAX), "age").unwrap_err();
        assert!(err.to_string().contains("`age`"));
    }

    #[test]
    fn uuid_accepts_hyphenated_text() {
        let id = Uuid::new_v4();
        let parsed = Uuid::from_value(Value::Text(id.hyphenated().to_string()), "id").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn string_rejects_blob() {
        let err = String::from_value(Value::Bytes(vec![1, 2]), "name").unwrap_err();
        assert!(matches!(err, Error::Conversion { expected: "TEXT", .. }));
    }

    #[test]
    fn sentinel_follows_declared_type() {
        assert_eq!(Value::from_sentinel("0", SqlType::Integer), Value::Int(0));
        assert_eq!(Value::from_sentinel("1", SqlType::BigInt), Value::BigInt(1));
        assert_eq!(Value::from_sentinel("1", SqlType::Boolean), Value::Bool(true));
        assert_eq!(
            Value::from_sentinel("N", SqlType::Varchar),
            Value::Text("N".to_string())
        );
    }

    #[test]
    fn option_declared_type_is_inner_type() {
        assert_eq!(<Option<Uuid> as FieldValue>::SQL_TYPE, SqlType::Uuid);
        assert_eq!(<Option<String> as FieldValue>::SQL_TYPE, SqlType::Varchar);
    }
}
