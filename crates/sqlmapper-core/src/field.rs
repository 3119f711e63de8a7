//! Resolved field and column descriptors.

use crate::id::IdType;
use crate::types::SqlType;
use crate::value::Value;

/// Default "deleted" sentinel for soft-delete columns.
pub const DEFAULT_DELETED: &str = "1";
/// Default "not deleted" sentinel for soft-delete columns.
pub const DEFAULT_UNDELETED: &str = "0";

/// Sentinel pair written to a soft-delete column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicDelete {
    /// Value marking a row as deleted.
    pub deleted: &'static str,
    /// Value marking a live row.
    pub undeleted: &'static str,
}

impl Default for LogicDelete {
    fn default() -> Self {
        Self {
            deleted: DEFAULT_DELETED,
            undeleted: DEFAULT_UNDELETED,
        }
    }
}

/// Metadata about one mapped field/column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Declared property name
    pub name: &'static str,
    /// Database column name
    pub column_name: String,
    /// Declared property type
    pub sql_type: SqlType,
    /// Explicit type hint for the executing layer
    pub wire_type: Option<SqlType>,
    /// Whether this is the primary key
    pub primary_key: bool,
    /// Key generation strategy (only meaningful for the primary key)
    pub id_type: IdType,
    /// Whether this is the optimistic-lock version
    pub version: bool,
    /// Soft-delete sentinels, if this is the soft-delete column
    pub logic_delete: Option<LogicDelete>,
    /// Whether this field has a unique constraint
    pub unique: bool,
}

impl FieldInfo {
    /// Create a plain (non-key, non-version, non-deleted) field.
    pub fn new(name: &'static str, column_name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name,
            column_name: column_name.into(),
            sql_type,
            wire_type: None,
            primary_key: false,
            id_type: IdType::Auto,
            version: false,
            logic_delete: None,
            unique: false,
        }
    }

    /// Mark as the primary key with the given strategy.
    pub const fn primary_key(mut self, strategy: IdType) -> Self {
        self.primary_key = true;
        self.id_type = strategy;
        self
    }

    /// Set the explicit wire type.
    pub const fn wire_type(mut self, ty: Option<SqlType>) -> Self {
        self.wire_type = ty;
        self
    }

    /// Set the version flag.
    pub const fn version(mut self, value: bool) -> Self {
        self.version = value;
        self
    }

    /// Mark as the soft-delete column.
    pub const fn logic_delete(mut self, sentinels: LogicDelete) -> Self {
        self.logic_delete = Some(sentinels);
        self
    }

    /// Set the unique flag.
    pub const fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    /// True for the soft-delete column.
    #[must_use]
    pub const fn is_logic_delete(&self) -> bool {
        self.logic_delete.is_some()
    }

    /// True for fields written by ordinary SET clauses and criteria (not the
    /// key, the version or the soft-delete marker).
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        !self.primary_key && !self.version && self.logic_delete.is_none()
    }

    /// Type hint to attach to bindings of this field.
    ///
    /// Explicit wire types win; UUID-typed properties always carry a hint so
    /// the executor can bind them natively. A UUID key stored as `Varchar` or
    /// `Text` binds as a plain string unless it declares a `Uuid` wire type.
    #[must_use]
    pub fn param_type(&self) -> Option<SqlType> {
        self.wire_type.or(match self.sql_type {
            SqlType::Uuid => Some(SqlType::Uuid),
            _ => None,
        })
    }

    /// SQL literal for the "deleted" sentinel.
    #[must_use]
    pub fn deleted_literal(&self) -> String {
        sentinel_literal(self.logic_delete.unwrap_or_default().deleted)
    }

    /// SQL literal for the "not deleted" sentinel.
    #[must_use]
    pub fn undeleted_literal(&self) -> String {
        sentinel_literal(self.logic_delete.unwrap_or_default().undeleted)
    }

    /// The "not deleted" sentinel as a value of this field's type.
    #[must_use]
    pub fn undeleted_value(&self) -> Value {
        Value::from_sentinel(self.logic_delete.unwrap_or_default().undeleted, self.sql_type)
    }

    /// The initial optimistic-lock version.
    #[must_use]
    pub fn initial_version(&self) -> Value {
        match self.sql_type {
            SqlType::Integer => Value::Int(0),
            _ => Value::BigInt(0),
        }
    }
}

/// Render a sentinel as a SQL literal: integers stay bare, anything else is a
/// quoted string.
#[must_use]
pub fn sentinel_literal(sentinel: &str) -> String {
    if sentinel.parse::<i64>().is_ok() {
        sentinel.to_string()
    } else {
        format!("'{}'", sentinel.replace('\'', "''"))
    }
}
