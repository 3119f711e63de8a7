//! Procedural macros for sqlmapper.
//!
//! `#[derive(Entity)]` implements `sqlmapper_core::Entity` from `#[entity(...)]`
//! markers. Generated code refers to `::sqlmapper_core`, so the deriving crate
//! needs it as a dependency.
//!
//! ```ignore
//! #[derive(Debug, Default, Entity)]
//! #[entity(table = "t_article")]
//! pub struct Article {
//!     #[entity(id)]
//!     pub id: Option<i64>,
//!     #[entity(unique)]
//!     pub title: Option<String>,
//!     #[entity(version)]
//!     pub version: Option<i32>,
//!     #[entity(deleted)]
//!     pub deleted: Option<i32>,
//! }
//! ```
//!
//! Struct markers: `table = "..."`.
//!
//! Field markers: `id` / `id = "auto" | "uuid" | "snowflake"`, `column = "..."`,
//! `sql_type = "..."` (explicit binding type), `version`, `deleted` /
//! `deleted = "..", undeleted = ".."`, `unique`, `ignore`, and `parent` on an
//! embedded struct whose fields the entity inherits.
//!
//! Field types must implement `sqlmapper_core::FieldValue`; a `parent` field's
//! type must itself implement `Entity`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity_derive;

/// Derive `sqlmapper_core::Entity`.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match entity_derive::parse_entity(&input) {
        Ok(def) => entity_derive::generate_entity_impl(&def).into(),
        Err(e) => e.to_compile_error().into(),
    }
}
