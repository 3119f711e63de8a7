//! Core types and traits for sqlmapper.
//!
//! `sqlmapper-core` is the foundation layer of the workspace. It defines the
//! data model and the contracts the other crates build on.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: `Entity` is implemented by user types (usually through
//!   `#[derive(Entity)]`), `Executor` by whatever runs SQL.
//! - **Metadata**: `EntityDef`/`FieldDef` are what an entity declares,
//!   `TableInfo`/`FieldInfo` what the [`resolver`] makes of it (cached per type).
//! - **Data model**: `Value`, `SqlType` and `Row` move data between entities and
//!   the executor; `MappedStatement` and `Param` are the plans handed over.
//! - **Key generation**: [`id`] implements the UUID and snowflake strategies.
//!
//! # Who Uses This Crate
//!
//! - `sqlmapper-macros` generates `Entity` implementations defined here.
//! - `sqlmapper-query` turns `TableInfo` plus entity values into `MappedStatement`s.
//! - `sqlmapper-session` drives an `Executor` with those plans and paginates them.
//!
//! Most applications should use the `sqlmapper` facade.

pub mod entity;
pub mod error;
pub mod executor;
pub mod field;
pub mod id;
pub mod naming;
pub mod resolver;
pub mod row;
pub mod statement;
pub mod table;
pub mod types;
pub mod value;

pub use entity::{Entity, EntityDef, FieldDef, unknown_field};
pub use error::{ConfigError, Error, Result};
pub use executor::{Executor, InsertOutcome};
pub use field::{FieldInfo, LogicDelete};
pub use id::{IdType, SnowflakeGenerator, check_id_target, generate_id};
pub use resolver::{clear_cache, resolve};
pub use row::Row;
pub use statement::{MappedStatement, Param, StatementKind};
pub use table::TableInfo;
pub use types::SqlType;
pub use value::{FieldValue, Value};
