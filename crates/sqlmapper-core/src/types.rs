//! SQL type tags.
//!
//! A [`SqlType`] plays two roles on a field: the *declared property type* (how the
//! entity holds the value, which drives id generation) and, optionally, an
//! *explicit wire type* that the executing layer should bind with.

use serde::{Deserialize, Serialize};

/// SQL data types understood by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    /// Boolean
    Boolean,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// Double precision float
    Double,
    /// Exact decimal, carried as text
    Decimal,
    /// Variable-length character data
    Varchar,
    /// Unbounded text
    Text,
    /// Binary data
    Blob,
    /// 128-bit UUID
    Uuid,
    /// Timestamp (microseconds since the Unix epoch)
    Timestamp,
    /// JSON document
    Json,
}

impl SqlType {
    /// Upper-case wire name, as used in placeholder type hints.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE",
            SqlType::Decimal => "DECIMAL",
            SqlType::Varchar => "VARCHAR",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
            SqlType::Uuid => "UUID",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Json => "JSON",
        }
    }

    /// Parse a type name (case-insensitive). Common aliases are accepted.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" | "BIT" => Some(SqlType::Boolean),
            "INTEGER" | "INT" | "SMALLINT" | "TINYINT" => Some(SqlType::Integer),
            "BIGINT" | "LONG" => Some(SqlType::BigInt),
            "DOUBLE" | "FLOAT" | "REAL" => Some(SqlType::Double),
            "DECIMAL" | "NUMERIC" => Some(SqlType::Decimal),
            "VARCHAR" | "CHAR" | "NVARCHAR" => Some(SqlType::Varchar),
            "TEXT" | "CLOB" | "LONGVARCHAR" => Some(SqlType::Text),
            "BLOB" | "BINARY" | "VARBINARY" | "BYTEA" => Some(SqlType::Blob),
            "UUID" | "OTHER" => Some(SqlType::Uuid),
            "TIMESTAMP" | "DATETIME" => Some(SqlType::Timestamp),
            "JSON" | "JSONB" => Some(SqlType::Json),
            _ => None,
        }
    }

    /// True for integer types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, SqlType::Integer | SqlType::BigInt)
    }

    /// True for character types.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, SqlType::Varchar | SqlType::Text)
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(SqlType::from_name("varchar"), Some(SqlType::Varchar));
        assert_eq!(SqlType::from_name(" BigInt "), Some(SqlType::BigInt));
        assert_eq!(SqlType::from_name("jsonb"), Some(SqlType::Json));
        assert_eq!(SqlType::from_name("geometry"), None);
    }

    #[test]
    fn classification() {
        assert!(SqlType::BigInt.is_integer());
        assert!(!SqlType::Double.is_integer());
        assert!(SqlType::Text.is_textual());
        assert!(!SqlType::Uuid.is_textual());
    }
}
