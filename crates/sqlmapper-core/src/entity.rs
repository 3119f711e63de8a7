//! Declaring entities.
//!
//! An entity describes itself with an [`EntityDef`]: a table name, its own field
//! declarations in order, and optionally the definition of the entity it
//! extends. `#[derive(Entity)]` generates the definition from `#[entity(...)]`
//! markers; it can also be written by hand:
//!
//! ```ignore
//! impl Entity for User {
//!     fn definition() -> EntityDef {
//!         EntityDef::new::<User>()
//!             .table("t_user")
//!             .field(FieldDef::new("id", SqlType::BigInt).id(IdType::Auto))
//!             .field(FieldDef::new("userName", SqlType::Varchar))
//!     }
//!     // get_field / set_field ...
//! }
//! ```

use std::any::TypeId;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::field::LogicDelete;
use crate::id::IdType;
use crate::resolver;
use crate::row::Row;
use crate::table::TableInfo;
use crate::types::SqlType;
use crate::value::Value;

/// One field as declared on an entity type, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Declared property name
    pub name: &'static str,
    /// Declared property type
    pub sql_type: SqlType,
    /// Explicit column name
    pub column: Option<&'static str>,
    /// Explicit wire type
    pub wire_type: Option<SqlType>,
    /// Primary-key strategy, if this is the key
    pub id: Option<IdType>,
    /// Optimistic-lock version marker
    pub version: bool,
    /// Soft-delete sentinels, if this is the soft-delete column
    pub deleted: Option<LogicDelete>,
    /// Unique-constraint marker
    pub unique: bool,
    /// Not mapped to any column
    pub ignore: bool,
}

impl FieldDef {
    /// Declare a field.
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            column: None,
            wire_type: None,
            id: None,
            version: false,
            deleted: None,
            unique: false,
            ignore: false,
        }
    }

    /// Map to an explicit column name.
    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    /// Bind with an explicit type hint.
    pub const fn wire_type(mut self, ty: SqlType) -> Self {
        self.wire_type = Some(ty);
        self
    }

    /// Mark as the primary key.
    pub const fn id(mut self, strategy: IdType) -> Self {
        self.id = Some(strategy);
        self
    }

    /// Mark as the optimistic-lock version.
    pub const fn version(mut self) -> Self {
        self.version = true;
        self
    }

    /// Mark as the soft-delete column with the default `1`/`0` sentinels.
    pub const fn deleted(self) -> Self {
        self.deleted_with("1", "0")
    }

    /// Mark as the soft-delete column with custom sentinels.
    pub const fn deleted_with(mut self, deleted: &'static str, undeleted: &'static str) -> Self {
        self.deleted = Some(LogicDelete { deleted, undeleted });
        self
    }

    /// Mark as unique.
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Exclude from mapping. The name still shadows ancestor fields.
    pub const fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }
}

/// The declaration of one entity type.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Identity of the declaring type
    pub type_id: TypeId,
    /// Short type name, used for statement ids and messages
    pub type_name: &'static str,
    /// Table name marker
    pub table: Option<&'static str>,
    /// Own fields in declaration order
    pub fields: Vec<FieldDef>,
    /// Definition of the extended entity
    pub parent: Option<Box<EntityDef>>,
}

impl EntityDef {
    /// Start a definition for `E`.
    pub fn new<E: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: short_type_name(std::any::type_name::<E>()),
            table: None,
            fields: Vec::new(),
            parent: None,
        }
    }

    /// Set the table name.
    pub fn table(mut self, name: &'static str) -> Self {
        self.table = Some(name);
        self
    }

    /// Append a field declaration.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Inherit the fields of `parent`.
    pub fn extends(mut self, parent: EntityDef) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// This definition followed by its ancestors, most-derived first.
    pub fn lineage(&self) -> impl Iterator<Item = &EntityDef> {
        std::iter::successors(Some(self), |def| def.parent.as_deref())
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A type that maps to one table.
///
/// Field access goes through declared property names, so the synthesizer can
/// read and write any entity without knowing its concrete type.
pub trait Entity: Default + Send + Sync + 'static {
    /// The entity's declaration.
    fn definition() -> EntityDef;

    /// Current value of the field `name`, or `None` if there is no such field.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Overwrite the field `name`.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    /// The resolved (and cached) table descriptor.
    fn table_info() -> Result<Arc<TableInfo>> {
        resolver::resolve::<Self>()
    }

    /// Build an entity from a result row, matching columns by name. Columns the
    /// descriptor does not know are ignored; missing columns keep their default.
    fn from_row(row: &Row, table: &TableInfo) -> Result<Self> {
        let mut entity = Self::default();
        for field in &table.fields {
            if let Some(value) = row.get_by_name(&field.column_name) {
                entity.set_field(field.name, value.clone())?;
            }
        }
        Ok(entity)
    }
}

/// Error for a `set_field` call naming an unknown field.
pub fn unknown_field<E: Entity>(field: &str) -> crate::error::Error {
    ConfigError::UnknownField {
        entity: short_type_name(std::any::type_name::<E>()),
        field: field.to_string(),
    }
    .into()
}
