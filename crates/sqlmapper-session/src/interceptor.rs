//! Transparent pagination of SELECT plans.
//!
//! Given a page, [`PaginationInterceptor::query`] runs two derived plans in
//! place of the original one:
//!
//! 1. `<id>_COUNT` wraps the original SQL in the dialect's COUNT query and
//!    writes the result into the page.
//! 2. `<id>_PAGE` appends the page's ORDER BY (if any) and the dialect's row
//!    window.
//!
//! A plan that already caps its rows (`select_all`, `select_one`) is wrapped as
//! a derived table first, so the window applies within the cap.
//!
//! Both plans are new objects carrying their own copy of the parameters; the
//! original `Arc<MappedStatement>` is left untouched and may be shared freely.

use std::sync::Arc;

use sqlmapper_core::error::{ConfigError, Error, Result};
use sqlmapper_core::naming::is_valid_order_list;
use sqlmapper_core::{Executor, MappedStatement, Row};
use sqlmapper_query::Dialect;

use crate::config::PaginationConfig;
use crate::context::PageHelper;
use crate::page::Pageable;

/// Suffix of the derived COUNT plan's id.
pub const COUNT_SUFFIX: &str = "_COUNT";
/// Suffix of the derived page plan's id.
pub const PAGE_SUFFIX: &str = "_PAGE";

/// Rewrites SELECT plans into COUNT + page queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationInterceptor {
    config: PaginationConfig,
}

impl PaginationInterceptor {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    /// Run `stmt`, paginating it when a page is in play.
    ///
    /// An explicit `page` wins over the page installed by
    /// [`PageHelper::page`]. Without either, and for anything but a SELECT, the
    /// plan runs as-is.
    #[tracing::instrument(level = "debug", skip(self, executor, stmt, page), fields(statement = %stmt.id))]
    pub fn query<X: Executor + ?Sized>(
        &self,
        executor: &mut X,
        stmt: &Arc<MappedStatement>,
        page: Option<&mut dyn Pageable>,
    ) -> Result<Vec<Row>> {
        if !stmt.is_select() {
            return executor.query(stmt);
        }
        match page {
            Some(page) => self.paginate(executor, stmt, page),
            None => PageHelper::with_local_page(|local| match local {
                Some(page) => self.paginate(executor, stmt, page),
                None => executor.query(stmt),
            }),
        }
    }

    fn paginate<X: Executor + ?Sized>(
        &self,
        executor: &mut X,
        stmt: &Arc<MappedStatement>,
        page: &mut dyn Pageable,
    ) -> Result<Vec<Row>> {
        let (current, size) = validate(page)?;
        let original = stmt.sql.trim();
        let dialect = self.dialect();

        if page.search_count() {
            let total = self.count(executor, stmt, original)?;
            page.set_total(total);

            if total == 0 {
                tracing::debug!("No matching rows, skipping page query");
                page.clear_records();
                return Ok(Vec::new());
            }
            if self.config.overflow && current > 1 && current > page.pages() {
                tracing::debug!(current, pages = page.pages(), "Page past the end, returning empty");
                page.clear_records();
                return Ok(Vec::new());
            }
        }

        let source = match stmt.row_limit {
            Some(limit) => {
                tracing::trace!(limit, "Plan is already capped, paging over a derived table");
                dialect.wrap_subquery(original)
            }
            None => original.to_string(),
        };

        let ordered = match page.orders().map(str::trim).filter(|o| !o.is_empty()) {
            Some(orders) => {
                if !is_valid_order_list(orders) {
                    return Err(ConfigError::InvalidOrderBy {
                        clause: orders.to_string(),
                    }
                    .into());
                }
                let direction = if page.asc() { "ASC" } else { "DESC" };
                format!("{source} ORDER BY {orders} {direction}")
            }
            None => source,
        };

        let paged = stmt.derive(
            PAGE_SUFFIX,
            dialect.build_pagination_sql(&ordered, current, size),
        );
        tracing::trace!(sql = %paged, "Paged query");
        executor.query(&paged)
    }

    fn count<X: Executor + ?Sized>(
        &self,
        executor: &mut X,
        stmt: &Arc<MappedStatement>,
        original: &str,
    ) -> Result<u64> {
        let count = stmt.derive(COUNT_SUFFIX, self.dialect().build_count_sql(original));
        tracing::trace!(sql = %count, "Count query");

        let rows = executor.query(&count).map_err(|e| Error::CountQuery {
            statement: stmt.id.clone(),
            source: Box::new(e),
        })?;
        let total = rows
            .first()
            .and_then(|row| row.get(0))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

fn validate(page: &dyn Pageable) -> Result<(u64, u64)> {
    let size = u64::try_from(page.size())
        .ok()
        .filter(|s| *s > 0)
        .ok_or(ConfigError::InvalidPage {
            what: "page size",
            value: page.size(),
        })?;
    let current = u64::try_from(page.current())
        .ok()
        .filter(|c| *c > 0)
        .ok_or(ConfigError::InvalidPage {
            what: "current page",
            value: page.current(),
        })?;
    Ok((current, size))
}
