//! Execution side of sqlmapper: typed mappers and transparent pagination.
//!
//! - [`BaseMapper`] runs the fixed CRUD operation set for one entity type on an
//!   [`Executor`](sqlmapper_core::Executor), mapping rows back into entities and
//!   writing database-assigned keys back after inserts.
//! - [`PaginationInterceptor`] turns a SELECT plus a page into a COUNT query and
//!   a windowed query.
//! - [`Page`] carries the request and the result; [`PageHelper`] installs one
//!   for the current thread so queries that don't take a page still get paged.
//!
//! # Example
//!
//! ```ignore
//! let mut mapper = BaseMapper::<User, _>::with_config(&mut executor, config);
//!
//! let page = mapper.page(Page::new(2, 10), Some(&criteria))?;
//! println!("{} of {}", page.records().len(), page.total());
//!
//! // Same thing without passing the page around
//! let page = PageHelper::page(2, 10, || mapper.select_list(Some(&criteria)))?;
//! ```

pub mod config;
pub mod context;
pub mod interceptor;
pub mod mapper;
pub mod page;

pub use config::PaginationConfig;
pub use context::PageHelper;
pub use interceptor::{COUNT_SUFFIX, PAGE_SUFFIX, PaginationInterceptor};
pub use mapper::BaseMapper;
pub use page::{DEFAULT_PAGE_SIZE, Page, Pageable};
