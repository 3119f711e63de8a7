//! Executable statement plans.

use std::fmt;
use std::sync::Arc;

use crate::types::SqlType;
use crate::value::Value;

/// What a statement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// One bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Property path the value was read from (`id`, `entity.email`, `list[2].name`, ...)
    pub path: String,
    /// Bound value
    pub value: Value,
    /// Type hint for the executor
    pub sql_type: Option<SqlType>,
}

impl Param {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
            sql_type: None,
        }
    }

    /// Attach a type hint.
    pub fn with_type(mut self, sql_type: Option<SqlType>) -> Self {
        self.sql_type = sql_type;
        self
    }
}

/// An immutable, executable plan: SQL text plus its bindings in placeholder
/// order.
///
/// Plans are shared as `Arc<MappedStatement>`; rewriting one always produces a
/// new plan through [`MappedStatement::derive`].
#[derive(Debug, Clone, PartialEq)]
pub struct MappedStatement {
    /// `<Entity>.<operation>`, plus a suffix for derived plans
    pub id: String,
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<Param>,
    /// Row cap already written into `sql`, if any
    pub row_limit: Option<u64>,
}

impl MappedStatement {
    pub fn new(id: impl Into<String>, kind: StatementKind, sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            id: id.into(),
            kind,
            sql: sql.into(),
            params,
            row_limit: None,
        }
    }

    /// Record that `sql` already ends in a cap of `limit` rows.
    pub fn with_row_limit(mut self, limit: u64) -> Self {
        self.row_limit = Some(limit);
        self
    }

    /// A plan with no SQL, used when there is nothing to do. Executors treat it
    /// as affecting zero rows.
    pub fn empty(id: impl Into<String>, kind: StatementKind) -> Self {
        Self::new(id, kind, String::new(), Vec::new())
    }

    /// True if there is no SQL to run.
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }

    pub fn is_select(&self) -> bool {
        self.kind == StatementKind::Select
    }

    /// Build a new plan `<id><suffix>` running `sql` with a copy of this plan's
    /// parameters. The derived plan carries no row cap of its own.
    pub fn derive(&self, suffix: &str, sql: impl Into<String>) -> Arc<MappedStatement> {
        Arc::new(Self {
            id: format!("{}{}", self.id, suffix),
            kind: self.kind,
            sql: sql.into(),
            params: self.params.clone(),
            row_limit: None,
        })
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.iter().map(|p| &p.value)
    }

    pub fn into_shared(self) -> Arc<MappedStatement> {
        Arc::new(self)
    }
}

impl fmt::Display for MappedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
