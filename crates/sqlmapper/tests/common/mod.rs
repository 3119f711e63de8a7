//! In-memory SQLite executor shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use sqlmapper::prelude::*;

/// Runs plans on an in-memory SQLite database and remembers their SQL.
pub struct SqliteExecutor {
    conn: Connection,
    pub log: Vec<String>,
}

impl SqliteExecutor {
    /// Open a fresh database and run `schema` on it.
    pub fn with_schema(schema: &str) -> Self {
        let conn = Connection::open_in_memory().expect("open sqlite memory db");
        conn.execute_batch(schema).expect("create schema");
        Self {
            conn,
            log: Vec::new(),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Single integer returned by `sql`, bypassing the mapper.
    pub fn scalar(&self, sql: &str) -> i64 {
        self.conn
            .query_row(sql, [], |row| row.get(0))
            .expect("scalar query")
    }

    fn run_query(&mut self, sql: &str, stmt: &MappedStatement) -> Result<Vec<Row>> {
        self.log.push(sql.to_string());
        let mut prepared = self.conn.prepare(sql).map_err(Error::execution)?;
        let columns: Arc<Vec<String>> = Arc::new(
            prepared
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        let mut rows = prepared
            .query(params_from_iter(stmt.values().map(to_sqlite)))
            .map_err(Error::execution)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(Error::execution)? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_sqlite(row.get_ref(i).map_err(Error::execution)?));
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(out)
    }
}

impl Executor for SqliteExecutor {
    fn query(&mut self, stmt: &MappedStatement) -> Result<Vec<Row>> {
        if stmt.is_empty() {
            return Ok(Vec::new());
        }
        self.run_query(&stmt.sql, stmt)
    }

    fn execute(&mut self, stmt: &MappedStatement) -> Result<u64> {
        if stmt.is_empty() {
            return Ok(0);
        }
        self.log.push(stmt.sql.clone());
        let affected = self
            .conn
            .execute(&stmt.sql, params_from_iter(stmt.values().map(to_sqlite)))
            .map_err(Error::execution)?;
        Ok(affected as u64)
    }

    fn insert(&mut self, stmt: &MappedStatement, key_column: Option<&str>) -> Result<InsertOutcome> {
        match key_column {
            Some(key) => {
                let sql = format!("{} RETURNING {}", stmt.sql, key);
                let rows = self.run_query(&sql, stmt)?;
                let generated_keys: Vec<Value> = rows
                    .into_iter()
                    .filter_map(|row| row.into_values().into_iter().next())
                    .collect();
                Ok(InsertOutcome {
                    affected: generated_keys.len() as u64,
                    generated_keys,
                })
            }
            None => Ok(InsertOutcome {
                affected: self.execute(stmt)?,
                generated_keys: Vec::new(),
            }),
        }
    }
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::Int(i) => SqliteValue::Integer(i64::from(*i)),
        Value::BigInt(i) | Value::Timestamp(i) => SqliteValue::Integer(*i),
        Value::Double(f) => SqliteValue::Real(*f),
        Value::Decimal(s) | Value::Text(s) => SqliteValue::Text(s.clone()),
        Value::Bytes(b) => SqliteValue::Blob(b.clone()),
        Value::Uuid(u) => SqliteValue::Text(u.hyphenated().to_string()),
        Value::Json(j) => SqliteValue::Text(j.to_string()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::BigInt(i),
        ValueRef::Real(f) => Value::Double(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}
