//! Typed CRUD facade over an [`Executor`].

use std::marker::PhantomData;
use std::sync::Arc;

use sqlmapper_core::{Entity, Executor, MappedStatement, Result, Row, TableInfo, Value};
use sqlmapper_query::SqlProvider;

use crate::config::PaginationConfig;
use crate::interceptor::PaginationInterceptor;
use crate::page::{Page, Pageable};

/// CRUD operations for entity `E`, run on `X`.
///
/// Every SELECT goes through the [`PaginationInterceptor`], so a page passed to
/// [`select_page`](Self::select_page) or installed with
/// [`PageHelper::page`](crate::PageHelper::page) paginates it. Inserts with a
/// database-assigned key write the generated keys back into the entities.
pub struct BaseMapper<'x, E, X: Executor + ?Sized> {
    executor: &'x mut X,
    provider: SqlProvider,
    pagination: PaginationInterceptor,
    _entity: PhantomData<fn() -> E>,
}

impl<'x, E: Entity, X: Executor + ?Sized> BaseMapper<'x, E, X> {
    /// Mapper with the default (mysql, no overflow guard) configuration.
    pub fn new(executor: &'x mut X) -> Self {
        Self::with_config(executor, PaginationConfig::default())
    }

    pub fn with_config(executor: &'x mut X, config: PaginationConfig) -> Self {
        Self {
            executor,
            provider: SqlProvider::new(config.dialect),
            pagination: PaginationInterceptor::new(config),
            _entity: PhantomData,
        }
    }

    /// The statement generator this mapper uses.
    pub fn provider(&self) -> &SqlProvider {
        &self.provider
    }

    pub fn executor(&mut self) -> &mut X {
        &mut *self.executor
    }

    /// Insert every column. Returns the number of rows inserted.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn insert(&mut self, entity: &mut E) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.insert(&table, entity)?;
        self.run_insert(&table, &stmt, std::slice::from_mut(entity))
    }

    /// Insert the non-null columns.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn insert_selective(&mut self, entity: &mut E) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.insert_selective(&table, entity)?;
        self.run_insert(&table, &stmt, std::slice::from_mut(entity))
    }

    /// Insert `entities` with one statement.
    #[tracing::instrument(level = "debug", skip_all, fields(count = entities.len()))]
    pub fn insert_batch(&mut self, entities: &mut [E]) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.insert_batch(&table, entities)?;
        self.run_insert(&table, &stmt, entities)
    }

    /// Update every plain column by key. With a version field, returns 0 when
    /// another writer got there first.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn update_by_id(&mut self, entity: &E) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.update_by_id(&table, entity)?;
        self.execute(&stmt)
    }

    /// Update the non-null plain columns by key.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn update_selective_by_id(&mut self, entity: &E) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.update_selective_by_id(&table, entity)?;
        self.execute(&stmt)
    }

    /// Fetch one live row by key.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn get_by_id(&mut self, id: impl Into<Value>) -> Result<Option<E>> {
        let table = E::table_info()?;
        let stmt = self.provider.get_by_id(&table, id.into())?;
        Ok(self.select(&table, stmt, None)?.into_iter().next())
    }

    /// Fetch the live rows whose key is in `ids`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn select_batch_ids<I, V>(&mut self, ids: I) -> Result<Vec<E>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let table = E::table_info()?;
        let ids: Vec<Value> = ids.into_iter().map(Into::into).collect();
        let stmt = self.provider.select_batch_ids(&table, &ids)?;
        self.select(&table, stmt, None)
    }

    /// Every live row, up to the `select_all` cap.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn select_all(&mut self) -> Result<Vec<E>> {
        let table = E::table_info()?;
        let stmt = self.provider.select_all(&table)?;
        self.select(&table, stmt, None)
    }

    /// Live rows matching the non-null plain fields of `criteria`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn select_list(&mut self, criteria: Option<&E>) -> Result<Vec<E>> {
        let table = E::table_info()?;
        let stmt = self.provider.select_list(&table, criteria)?;
        self.select(&table, stmt, None)
    }

    /// First live row matching `criteria`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn select_one(&mut self, criteria: Option<&E>) -> Result<Option<E>> {
        let table = E::table_info()?;
        let stmt = self.provider.select_one(&table, criteria)?;
        Ok(self.select(&table, stmt, None)?.into_iter().next())
    }

    /// Number of live rows matching `criteria`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn select_count(&mut self, criteria: Option<&E>) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.select_count(&table, criteria)?.into_shared();
        let rows = self.pagination.query(&mut *self.executor, &stmt, None)?;
        let count = rows
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Mark one row deleted.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn delete_by_id(&mut self, id: impl Into<Value>) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.delete_by_id(&table, id.into())?;
        self.execute(&stmt)
    }

    /// Mark the live rows matching `criteria` deleted.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn delete(&mut self, criteria: Option<&E>) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.delete(&table, criteria)?;
        self.execute(&stmt)
    }

    /// Physically delete one row.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn remove_by_id(&mut self, id: impl Into<Value>) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.remove_by_id(&table, id.into())?;
        self.execute(&stmt)
    }

    /// Physically delete the rows matching `criteria`; every row without one.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn remove(&mut self, criteria: Option<&E>) -> Result<u64> {
        let table = E::table_info()?;
        let stmt = self.provider.remove(&table, criteria)?;
        self.execute(&stmt)
    }

    /// One page of the rows matching `criteria`. `page` receives the total.
    #[tracing::instrument(level = "debug", skip_all, fields(current = page.current(), size = page.size()))]
    pub fn select_page(&mut self, page: &mut dyn Pageable, criteria: Option<&E>) -> Result<Vec<E>> {
        let table = E::table_info()?;
        let stmt = self.provider.select_page(&table, criteria)?;
        self.select(&table, stmt, Some(page))
    }

    /// Like [`select_page`](Self::select_page), with the records stored in the
    /// returned page.
    pub fn page(&mut self, mut page: Page<E>, criteria: Option<&E>) -> Result<Page<E>> {
        let records = self.select_page(&mut page, criteria)?;
        page.set_records(records);
        Ok(page)
    }

    fn select(
        &mut self,
        table: &TableInfo,
        stmt: MappedStatement,
        page: Option<&mut dyn Pageable>,
    ) -> Result<Vec<E>> {
        let stmt = stmt.into_shared();
        let rows = self.pagination.query(&mut *self.executor, &stmt, page)?;
        map_rows(&rows, table)
    }

    fn execute(&mut self, stmt: &MappedStatement) -> Result<u64> {
        if stmt.is_empty() {
            tracing::debug!(statement = %stmt.id, "Empty statement, nothing to execute");
            return Ok(0);
        }
        self.executor.execute(stmt)
    }

    fn run_insert(&mut self, table: &Arc<TableInfo>, stmt: &MappedStatement, entities: &mut [E]) -> Result<u64> {
        let key = table.id_field().filter(|f| f.id_type.is_host_assigned());
        let outcome = self
            .executor
            .insert(stmt, key.map(|f| f.column_name.as_str()))?;

        if let Some(key) = key {
            if outcome.generated_keys.len() != entities.len() {
                tracing::warn!(
                    statement = %stmt.id,
                    expected = entities.len(),
                    returned = outcome.generated_keys.len(),
                    "Generated key count does not match inserted entities"
                );
            }
            for (entity, value) in entities.iter_mut().zip(outcome.generated_keys) {
                entity.set_field(key.name, value)?;
            }
        }
        Ok(outcome.affected)
    }
}

fn map_rows<E: Entity>(rows: &[Row], table: &TableInfo) -> Result<Vec<E>> {
    rows.iter().map(|row| E::from_row(row, table)).collect()
}
