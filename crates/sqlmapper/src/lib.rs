//! Metadata-driven CRUD SQL and transparent pagination.
//!
//! Describe an entity once, get parameterized SQL for the usual single-table
//! operations, and page any SELECT without writing COUNT or LIMIT by hand.
//!
//! ```ignore
//! use sqlmapper::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(table = "t_user")]
//! struct User {
//!     #[entity(id)]
//!     id: Option<i64>,
//!     username: Option<String>,
//!     #[entity(version)]
//!     version: Option<i32>,
//!     #[entity(deleted)]
//!     deleted: Option<i32>,
//! }
//!
//! let mut users = BaseMapper::<User, _>::new(&mut executor);
//! let mut alice = User { username: Some("alice".into()), ..User::default() };
//! users.insert(&mut alice)?;          // alice.id is now set
//! users.delete_by_id(alice.id)?;      // soft delete
//! let page = users.page(Page::new(1, 10), None)?;
//! ```
//!
//! The derive macro expands to paths under `sqlmapper_core`, so crates that
//! derive `Entity` depend on `sqlmapper-core` as well.
//!
//! # Crates
//!
//! - `sqlmapper-core`: values, entity metadata, descriptor cache, key generation
//! - `sqlmapper-macros`: `#[derive(Entity)]`
//! - `sqlmapper-query`: dialects and the statement synthesizer
//! - `sqlmapper-session`: mappers, pages and the pagination interceptor

pub use sqlmapper_core::{
    ConfigError, Entity, EntityDef, Error, Executor, FieldDef, FieldInfo, FieldValue, IdType,
    InsertOutcome, MappedStatement, Param, Result, Row, SqlType, StatementKind, TableInfo, Value,
    clear_cache, generate_id, resolve,
};
pub use sqlmapper_macros::Entity;
pub use sqlmapper_query::{Dialect, SqlProvider};
pub use sqlmapper_session::{
    BaseMapper, Page, PageHelper, Pageable, PaginationConfig, PaginationInterceptor,
};

pub mod prelude {
    //! Everything needed to declare entities and run mappers.

    pub use sqlmapper_core::{
        ConfigError, Entity, EntityDef, Error, Executor, FieldDef, FieldValue, IdType,
        InsertOutcome, MappedStatement, Result, Row, SqlType, TableInfo, Value,
    };
    pub use sqlmapper_macros::Entity;
    pub use sqlmapper_query::{Dialect, SqlProvider};
    pub use sqlmapper_session::{
        BaseMapper, Page, PageHelper, Pageable, PaginationConfig, PaginationInterceptor,
    };
}
