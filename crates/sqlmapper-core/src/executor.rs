//! The seam to whatever actually runs SQL.

use crate::error::Result;
use crate::row::Row;
use crate::statement::MappedStatement;
use crate::value::Value;

/// Result of an INSERT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    /// Rows inserted
    pub affected: u64,
    /// Database-assigned keys, one per inserted row, in insertion order
    pub generated_keys: Vec<Value>,
}

/// Runs statement plans.
///
/// Implementations own connections and transactions. Placeholders in
/// [`MappedStatement::sql`] line up with [`MappedStatement::params`]. A plan whose
/// SQL is empty must be treated as a no-op affecting zero rows.
pub trait Executor {
    /// Run a SELECT.
    fn query(&mut self, stmt: &MappedStatement) -> Result<Vec<Row>>;

    /// Run an UPDATE or DELETE, returning the affected row count.
    fn execute(&mut self, stmt: &MappedStatement) -> Result<u64>;

    /// Run an INSERT. With `key_column` set, the executor reports the keys the
    /// database generated for that column.
    fn insert(&mut self, stmt: &MappedStatement, key_column: Option<&str>) -> Result<InsertOutcome>;
}

impl<X: Executor + ?Sized> Executor for &mut X {
    fn query(&mut self, stmt: &MappedStatement) -> Result<Vec<Row>> {
        (**self).query(stmt)
    }

    fn execute(&mut self, stmt: &MappedStatement) -> Result<u64> {
        (**self).execute(stmt)
    }

    fn insert(&mut self, stmt: &MappedStatement, key_column: Option<&str>) -> Result<InsertOutcome> {
        (**self).insert(stmt, key_column)
    }
}
