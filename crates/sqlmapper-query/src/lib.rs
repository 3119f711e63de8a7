//! Statement synthesis for sqlmapper.
//!
//! - [`Dialect`] knows how each supported database spells placeholders, row
//!   counts and page windows.
//! - [`SqlProvider`] turns a resolved `TableInfo` plus entity values into
//!   `MappedStatement`s for the fixed CRUD operation set.
//!
//! Nothing here executes SQL; see `sqlmapper-session` for that.

pub mod dialect;
pub mod provider;

pub use dialect::Dialect;
pub use provider::{CRITERIA_PREFIX, DEFAULT_SELECT_ALL_LIMIT, ENTITY_PREFIX, SqlProvider};
