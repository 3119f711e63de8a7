//! Error types shared by every sqlmapper crate.
//!
//! Errors fall into three groups:
//!
//! - **Configuration errors** ([`ConfigError`]) are caller misuse detected before any
//!   SQL reaches the executor: a missing table marker, a logical delete against an
//!   entity without a soft-delete field, an empty batch, and so on.
//! - **Precondition failures** guard optimistic locking (a null version field).
//! - **Execution failures** come from the external [`Executor`](crate::Executor) and
//!   are propagated unchanged, except COUNT failures during pagination which are
//!   wrapped with the originating statement id.

use crate::id::IdType;
use crate::types::SqlType;

/// Result alias used throughout sqlmapper.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The primary error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller misuse, raised before touching the executor.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A consistency precondition did not hold (e.g. null optimistic-lock version).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A value could not be converted to or from an entity field.
    #[error("cannot convert field `{field}`: expected {expected}, found {found}")]
    Conversion {
        /// Declared field name.
        field: String,
        /// Expected representation.
        expected: &'static str,
        /// Representation actually found.
        found: String,
    },

    /// The COUNT query issued by the pagination rewriter failed.
    #[error("failed to execute count query for {statement}: {source}")]
    CountQuery {
        /// Id of the statement that was being paginated.
        statement: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// Failure surfaced by the executing layer.
    #[error("execution failed: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wrap an executor-side error.
    pub fn execution<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Error::Execution(err.into())
    }

    /// Build a conversion error for `field`.
    pub fn conversion(field: impl Into<String>, expected: &'static str, found: impl Into<String>) -> Self {
        Error::Conversion {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }

    /// True if this is a configuration error.
    pub const fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// The configuration error, if any.
    pub const fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

/// Caller misuse detected before any SQL executes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The entity definition carries no table-name marker.
    #[error("entity `{entity}` has no table name; declare one with `table = \"...\"`")]
    MissingTable { entity: &'static str },

    /// The operation needs a primary key but the entity declares none.
    #[error("entity `{entity}` has no primary key field")]
    MissingPrimaryKey { entity: &'static str },

    /// More than one field claims a single-valued role (id, version, deleted).
    #[error("entity `{entity}` declares more than one {role} field (`{first}` and `{second}`)")]
    DuplicateRole {
        entity: &'static str,
        role: &'static str,
        first: String,
        second: String,
    },

    /// A table or column name is not a plain SQL identifier.
    #[error("`{name}` is not a valid SQL identifier")]
    InvalidIdentifier { name: String },

    /// Logical delete requested against an entity without a soft-delete field.
    #[error("entity `{entity}` does not support logical delete; use {alternative} instead")]
    LogicalDeleteUnsupported {
        entity: &'static str,
        alternative: &'static str,
    },

    /// Batch insert called with no entities.
    #[error("batch insert list cannot be empty")]
    EmptyBatch,

    /// IN-clause builder called with no values.
    #[error("IN condition values cannot be empty")]
    EmptyInList,

    /// Selective insert found no non-null column to insert.
    #[error("entity `{entity}` has no non-null column to insert")]
    NothingToInsert { entity: &'static str },

    /// The id strategy cannot render into the field's declared type.
    #[error("unsupported target type {target:?} for {strategy:?} id generation")]
    UnsupportedIdTarget { strategy: IdType, target: SqlType },

    /// Host-assigned ids are produced by the executor, never generated locally.
    #[error("AUTO ids are assigned by the database and cannot be generated")]
    AutoIdGeneration,

    /// Page number or size is not positive.
    #[error("{what} must be greater than 0, but was: {value}")]
    InvalidPage { what: &'static str, value: i64 },

    /// The page's ORDER BY clause is not a list of identifiers.
    #[error("invalid order by clause `{clause}`")]
    InvalidOrderBy { clause: String },

    /// A field name was not recognised by an entity accessor.
    #[error("entity `{entity}` has no field `{field}`")]
    UnknownField { entity: &'static str, field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_error() {
        let err: Error = ConfigError::EmptyBatch.into();
        assert!(err.is_config());
        assert_eq!(err.as_config(), Some(&ConfigError::EmptyBatch));
        assert_eq!(
            err.to_string(),
            "configuration error: batch insert list cannot be empty"
        );
    }

    #[test]
    fn logical_delete_message_names_alternative() {
        let err = ConfigError::LogicalDeleteUnsupported {
            entity: "Product",
            alternative: "remove_by_id",
        };
        assert!(err.to_string().contains("use remove_by_id instead"));
    }

    #[test]
    fn count_query_error_keeps_source() {
        let inner = Error::execution("no such table: t_user");
        let err = Error::CountQuery {
            statement: "User.select_page".to_string(),
            source: Box::new(inner),
        };
        let msg = err.to_string();
        assert!(msg.contains("User.select_page"));
        assert!(msg.contains("no such table"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
