//! CRUD statement synthesis.
//!
//! [`SqlProvider`] turns a [`TableInfo`] plus entity data into
//! [`MappedStatement`]s. It never touches storage; the only side effects are on
//! the entities passed to the insert operations, which get their generated key,
//! initial version and "not deleted" marker filled in.
//!
//! Every read, update and logical delete on a table with a soft-delete column is
//! restricted to live rows. Physical deletes (`remove*`) are not.

use sqlmapper_core::error::{ConfigError, Error, Result};
use sqlmapper_core::{
    Entity, FieldInfo, MappedStatement, Param, SqlType, StatementKind, TableInfo, Value,
    check_id_target, generate_id,
};

use crate::dialect::Dialect;

/// Upper bound on rows returned by `select_all`.
pub const DEFAULT_SELECT_ALL_LIMIT: u64 = 1000;

/// Parameter prefix for criteria-entity conditions.
pub const CRITERIA_PREFIX: &str = "ew";
/// Parameter prefix for selective updates.
pub const ENTITY_PREFIX: &str = "entity";

/// Accumulates SQL text and parameters, numbering placeholders as it goes.
struct StatementBuilder {
    dialect: Dialect,
    params: Vec<Param>,
}

impl StatementBuilder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    /// Record a parameter and return its placeholder.
    fn bind(&mut self, path: impl Into<String>, value: Value, sql_type: Option<SqlType>) -> String {
        self.params.push(Param::new(path, value).with_type(sql_type));
        self.dialect.placeholder(self.params.len())
    }

    fn bind_field(&mut self, field: &FieldInfo, path: impl Into<String>, value: Value) -> String {
        self.bind(path, value, field.param_type())
    }

    fn finish(self, table: &TableInfo, op: &str, kind: StatementKind, sql: String) -> MappedStatement {
        let id = format!("{}.{}", table.entity_name, op);
        tracing::debug!(statement = %id, params = self.params.len(), "Synthesized statement");
        tracing::trace!(sql = %sql, "Generated SQL");
        MappedStatement::new(id, kind, sql, self.params)
    }
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn field_value<E: Entity>(entity: &E, field: &FieldInfo) -> Value {
    entity.get_field(field.name).unwrap_or(Value::Null)
}

/// Generates the SQL for every mapper operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlProvider {
    dialect: Dialect,
}

impl SqlProvider {
    /// Create a provider for `dialect`.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect this provider targets.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// INSERT of every column. A database-assigned key is left out.
    pub fn insert<E: Entity>(&self, table: &TableInfo, entity: &mut E) -> Result<MappedStatement> {
        self.prepare_insert(table, entity)?;

        let mut b = StatementBuilder::new(self.dialect);
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for field in insert_fields(table) {
            columns.push(field.column_name.as_str());
            values.push(b.bind_field(field, field.name, field_value(entity, field)));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.table_name,
            columns.join(", "),
            values.join(", ")
        );
        Ok(b.finish(table, "insert", StatementKind::Insert, sql))
    }

    /// INSERT of the non-null columns only.
    pub fn insert_selective<E: Entity>(
        &self,
        table: &TableInfo,
        entity: &mut E,
    ) -> Result<MappedStatement> {
        self.prepare_insert(table, entity)?;

        let mut b = StatementBuilder::new(self.dialect);
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for field in insert_fields(table) {
            let value = field_value(entity, field);
            if value.is_null() {
                continue;
            }
            columns.push(field.column_name.as_str());
            values.push(b.bind_field(field, field.name, value));
        }

        if columns.is_empty() {
            return Err(ConfigError::NothingToInsert {
                entity: table.entity_name,
            }
            .into());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.table_name,
            columns.join(", "),
            values.join(", ")
        );
        Ok(b.finish(table, "insert_selective", StatementKind::Insert, sql))
    }

    /// One multi-row INSERT for `entities`, each row bound as `list[i].<field>`.
    pub fn insert_batch<E: Entity>(
        &self,
        table: &TableInfo,
        entities: &mut [E],
    ) -> Result<MappedStatement> {
        if entities.is_empty() {
            return Err(ConfigError::EmptyBatch.into());
        }
        // Fail before any row is touched.
        if let Some(id) = table.id_field().filter(|id| !id.id_type.is_host_assigned()) {
            check_id_target(id.id_type, id.sql_type)?;
        }
        for entity in entities.iter_mut() {
            self.prepare_insert(table, entity)?;
        }

        let fields: Vec<&FieldInfo> = insert_fields(table).collect();
        let columns: Vec<&str> = fields.iter().map(|f| f.column_name.as_str()).collect();

        let mut b = StatementBuilder::new(self.dialect);
        let mut tuples = Vec::with_capacity(entities.len());
        for (i, entity) in entities.iter().enumerate() {
            let placeholders: Vec<String> = fields
                .iter()
                .map(|f| b.bind_field(f, format!("list[{i}].{}", f.name), field_value(entity, f)))
                .collect();
            tuples.push(format!("({})", placeholders.join(", ")));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table.table_name,
            columns.join(", "),
            tuples.join(", ")
        );
        Ok(b.finish(table, "insert_batch", StatementKind::Insert, sql))
    }

    /// UPDATE of every plain column by primary key, with optimistic locking when
    /// the table has a version column.
    pub fn update_by_id<E: Entity>(&self, table: &TableInfo, entity: &E) -> Result<MappedStatement> {
        self.update(table, entity, false)
    }

    /// UPDATE of the non-null plain columns by primary key. When there is nothing
    /// to set the returned statement is empty.
    pub fn update_selective_by_id<E: Entity>(
        &self,
        table: &TableInfo,
        entity: &E,
    ) -> Result<MappedStatement> {
        self.update(table, entity, true)
    }

    fn update<E: Entity>(&self, table: &TableInfo, entity: &E, selective: bool) -> Result<MappedStatement> {
        let (op, prefix) = if selective {
            ("update_selective_by_id", format!("{ENTITY_PREFIX}."))
        } else {
            ("update_by_id", String::new())
        };
        let id_field = table.require_id()?;

        let version = match table.version_field() {
            Some(field) => {
                let current = field_value(entity, field);
                if current.is_null() {
                    return Err(Error::Precondition(format!(
                        "version field `{}` of {} cannot be null for optimistic locking",
                        field.name, table.entity_name
                    )));
                }
                Some((field, current))
            }
            None => None,
        };

        let mut b = StatementBuilder::new(self.dialect);
        let mut sets = Vec::new();
        for field in table.plain_fields() {
            let value = field_value(entity, field);
            if selective && value.is_null() {
                continue;
            }
            let placeholder = b.bind_field(field, format!("{prefix}{}", field.name), value);
            sets.push(format!("{} = {}", field.column_name, placeholder));
        }

        if sets.is_empty() && selective {
            tracing::debug!(entity = table.entity_name, "Nothing to update");
            return Ok(MappedStatement::empty(
                format!("{}.{op}", table.entity_name),
                StatementKind::Update,
            ));
        }

        if let Some((field, _)) = &version {
            sets.push(format!("{0} = {0} + 1", field.column_name));
        }

        let mut conditions = Vec::new();
        let id_placeholder = b.bind_field(
            id_field,
            format!("{prefix}{}", id_field.name),
            field_value(entity, id_field),
        );
        conditions.push(format!("{} = {}", id_field.column_name, id_placeholder));
        if let Some((field, current)) = version {
            let placeholder = b.bind_field(field, format!("{prefix}{}", field.name), current);
            conditions.push(format!("{} = {}", field.column_name, placeholder));
        }
        conditions.extend(table.logic_delete_predicate());

        let sql = format!(
            "UPDATE {} SET {}{}",
            table.table_name,
            sets.join(", "),
            where_clause(&conditions)
        );
        Ok(b.finish(table, op, StatementKind::Update, sql))
    }

    /// SELECT of one live row by primary key.
    pub fn get_by_id(&self, table: &TableInfo, id: Value) -> Result<MappedStatement> {
        let id_field = table.require_id()?;
        let mut b = StatementBuilder::new(self.dialect);

        let mut conditions: Vec<String> = table.logic_delete_predicate().into_iter().collect();
        let placeholder = b.bind_field(id_field, "id", id);
        conditions.push(format!("{} = {}", id_field.column_name, placeholder));

        let sql = format!(
            "SELECT {} FROM {}{}",
            table.select_columns(),
            table.table_name,
            where_clause(&conditions)
        );
        Ok(b.finish(table, "get_by_id", StatementKind::Select, sql))
    }

    /// SELECT of the live rows whose key is in `ids`. No ids selects nothing.
    pub fn select_batch_ids(&self, table: &TableInfo, ids: &[Value]) -> Result<MappedStatement> {
        let id_field = table.require_id()?;
        let mut b = StatementBuilder::new(self.dialect);

        let conditions = if ids.is_empty() {
            vec!["1 = 0".to_string()]
        } else {
            let mut conditions: Vec<String> = table.logic_delete_predicate().into_iter().collect();
            conditions.push(self.in_condition(&mut b, id_field, ids)?);
            conditions
        };

        let sql = format!(
            "SELECT {} FROM {}{}",
            table.select_columns(),
            table.table_name,
            where_clause(&conditions)
        );
        Ok(b.finish(table, "select_batch_ids", StatementKind::Select, sql))
    }

    /// `column IN (p0, p1, ...)` bound as `ids[i]`.
    fn in_condition(
        &self,
        b: &mut StatementBuilder,
        field: &FieldInfo,
        values: &[Value],
    ) -> Result<String> {
        if values.is_empty() {
            return Err(ConfigError::EmptyInList.into());
        }
        let placeholders: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| b.bind_field(field, format!("ids[{i}]"), v.clone()))
            .collect();
        Ok(format!("{} IN ({})", field.column_name, placeholders.join(", ")))
    }

    /// SELECT of every live row, capped at [`DEFAULT_SELECT_ALL_LIMIT`].
    pub fn select_all(&self, table: &TableInfo) -> Result<MappedStatement> {
        let b = StatementBuilder::new(self.dialect);
        let conditions: Vec<String> = table.logic_delete_predicate().into_iter().collect();
        let sql = format!(
            "SELECT {} FROM {}{}{}",
            table.select_columns(),
            table.table_name,
            where_clause(&conditions),
            self.dialect.limit_clause(DEFAULT_SELECT_ALL_LIMIT)
        );
        Ok(b.finish(table, "select_all", StatementKind::Select, sql)
            .with_row_limit(DEFAULT_SELECT_ALL_LIMIT))
    }

    /// SELECT filtered by the non-null plain fields of `criteria`.
    pub fn select_list<E: Entity>(
        &self,
        table: &TableInfo,
        criteria: Option<&E>,
    ) -> Result<MappedStatement> {
        self.select_where(table, criteria, "select_list", None)
    }

    /// Like [`select_list`](Self::select_list), capped at one row.
    pub fn select_one<E: Entity>(
        &self,
        table: &TableInfo,
        criteria: Option<&E>,
    ) -> Result<MappedStatement> {
        self.select_where(table, criteria, "select_one", Some(1))
    }

    /// Same query as [`select_list`](Self::select_list); meant to be paginated.
    pub fn select_page<E: Entity>(
        &self,
        table: &TableInfo,
        criteria: Option<&E>,
    ) -> Result<MappedStatement> {
        self.select_where(table, criteria, "select_page", None)
    }

    fn select_where<E: Entity>(
        &self,
        table: &TableInfo,
        criteria: Option<&E>,
        op: &str,
        limit: Option<u64>,
    ) -> Result<MappedStatement> {
        let mut b = StatementBuilder::new(self.dialect);
        let mut conditions: Vec<String> = table.logic_delete_predicate().into_iter().collect();
        conditions.extend(criteria_conditions(&mut b, table, criteria));

        let sql = format!(
            "SELECT {} FROM {}{}{}",
            table.select_columns(),
            table.table_name,
            where_clause(&conditions),
            limit.map(|n| self.dialect.limit_clause(n)).unwrap_or_default()
        );
        let stmt = b.finish(table, op, StatementKind::Select, sql);
        Ok(match limit {
            Some(n) => stmt.with_row_limit(n),
            None => stmt,
        })
    }

    /// `SELECT COUNT(*)` with the [`select_list`](Self::select_list) filter.
    pub fn select_count<E: Entity>(
        &self,
        table: &TableInfo,
        criteria: Option<&E>,
    ) -> Result<MappedStatement> {
        let mut b = StatementBuilder::new(self.dialect);
        let mut conditions: Vec<String> = table.logic_delete_predicate().into_iter().collect();
        conditions.extend(criteria_conditions(&mut b, table, criteria));

        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            table.table_name,
            where_clause(&conditions)
        );
        Ok(b.finish(table, "select_count", StatementKind::Select, sql))
    }

    /// Logical delete of one live row by primary key.
    pub fn delete_by_id(&self, table: &TableInfo, id: Value) -> Result<MappedStatement> {
        let deleted = require_logic_delete(table, "remove_by_id")?;
        let id_field = table.require_id()?;
        let mut b = StatementBuilder::new(self.dialect);

        let placeholder = b.bind_field(id_field, "id", id);
        let sql = format!(
            "UPDATE {} SET {} = {} WHERE {} = {} AND {} = {}",
            table.table_name,
            deleted.column_name,
            deleted.deleted_literal(),
            id_field.column_name,
            placeholder,
            deleted.column_name,
            deleted.undeleted_literal()
        );
        Ok(b.finish(table, "delete_by_id", StatementKind::Update, sql))
    }

    /// Logical delete of the live rows matching `criteria`.
    pub fn delete<E: Entity>(&self, table: &TableInfo, criteria: Option<&E>) -> Result<MappedStatement> {
        let deleted = require_logic_delete(table, "remove")?;
        let mut b = StatementBuilder::new(self.dialect);

        let mut conditions = vec![format!(
            "{} = {}",
            deleted.column_name,
            deleted.undeleted_literal()
        )];
        conditions.extend(criteria_conditions(&mut b, table, criteria));

        let sql = format!(
            "UPDATE {} SET {} = {}{}",
            table.table_name,
            deleted.column_name,
            deleted.deleted_literal(),
            where_clause(&conditions)
        );
        Ok(b.finish(table, "delete", StatementKind::Update, sql))
    }

    /// Physical DELETE by primary key, regardless of soft-delete state.
    pub fn remove_by_id(&self, table: &TableInfo, id: Value) -> Result<MappedStatement> {
        let id_field = table.require_id()?;
        let mut b = StatementBuilder::new(self.dialect);
        let placeholder = b.bind_field(id_field, "id", id);
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            table.table_name, id_field.column_name, placeholder
        );
        Ok(b.finish(table, "remove_by_id", StatementKind::Delete, sql))
    }

    /// Physical DELETE of the rows matching `criteria`, regardless of soft-delete
    /// state. Without criteria every row is removed.
    pub fn remove<E: Entity>(&self, table: &TableInfo, criteria: Option<&E>) -> Result<MappedStatement> {
        let mut b = StatementBuilder::new(self.dialect);
        let conditions = criteria_conditions(&mut b, table, criteria);
        let sql = format!("DELETE FROM {}{}", table.table_name, where_clause(&conditions));
        Ok(b.finish(table, "remove", StatementKind::Delete, sql))
    }

    /// Fill in a missing generated key, soft-delete marker and version.
    fn prepare_insert<E: Entity>(&self, table: &TableInfo, entity: &mut E) -> Result<()> {
        if let Some(id) = table.id_field() {
            if !id.id_type.is_host_assigned() && field_value(entity, id).is_null() {
                let value = generate_id(id.id_type, id.sql_type)?;
                entity.set_field(id.name, value)?;
            }
        }
        if let Some(deleted) = table.logic_delete_field() {
            if field_value(entity, deleted).is_null() {
                entity.set_field(deleted.name, deleted.undeleted_value())?;
            }
        }
        if let Some(version) = table.version_field() {
            if field_value(entity, version).is_null() {
                entity.set_field(version.name, version.initial_version())?;
            }
        }
        Ok(())
    }
}

/// Key (unless database-assigned) followed by every other column.
fn insert_fields(table: &TableInfo) -> impl Iterator<Item = &FieldInfo> {
    table
        .id_field()
        .filter(|id| !id.id_type.is_host_assigned())
        .into_iter()
        .chain(table.non_id_fields())
}

fn criteria_conditions<E: Entity>(
    b: &mut StatementBuilder,
    table: &TableInfo,
    criteria: Option<&E>,
) -> Vec<String> {
    let Some(entity) = criteria else {
        return Vec::new();
    };
    let mut conditions = Vec::new();
    for field in table.plain_fields() {
        let value = field_value(entity, field);
        if value.is_null() {
            continue;
        }
        let placeholder = b.bind_field(field, format!("{CRITERIA_PREFIX}.{}", field.name), value);
        conditions.push(format!("{} = {}", field.column_name, placeholder));
    }
    conditions
}

fn require_logic_delete<'t>(table: &'t TableInfo, alternative: &'static str) -> Result<&'t FieldInfo> {
    table.logic_delete_field().ok_or_else(|| {
        ConfigError::LogicalDeleteUnsupported {
            entity: table.entity_name,
            alternative,
        }
        .into()
    })
}
