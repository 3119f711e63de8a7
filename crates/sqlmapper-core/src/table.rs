//! Resolved table descriptors.

use std::any::TypeId;

use crate::error::{ConfigError, Result};
use crate::field::FieldInfo;

/// Everything the synthesizer needs to know about one entity's table.
///
/// Built once per entity type by the [resolver](crate::resolver) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    /// Identity of the entity type
    pub type_id: TypeId,
    /// Short entity type name
    pub entity_name: &'static str,
    /// Table name
    pub table_name: &'static str,
    /// Mapped fields, ancestors first
    pub fields: Vec<FieldInfo>,
    id: Option<usize>,
    version: Option<usize>,
    logic_delete: Option<usize>,
    unique: Vec<usize>,
}

impl TableInfo {
    /// Assemble a descriptor, locating the key, version and soft-delete fields.
    ///
    /// Callers must have checked that each role is claimed at most once.
    pub fn new(
        type_id: TypeId,
        entity_name: &'static str,
        table_name: &'static str,
        fields: Vec<FieldInfo>,
    ) -> Self {
        let id = fields.iter().position(|f| f.primary_key);
        let version = fields.iter().position(|f| f.version);
        let logic_delete = fields.iter().position(FieldInfo::is_logic_delete);
        let unique = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.unique)
            .map(|(i, _)| i)
            .collect();
        Self {
            type_id,
            entity_name,
            table_name,
            fields,
            id,
            version,
            logic_delete,
            unique,
        }
    }

    /// The primary key field.
    pub fn id_field(&self) -> Option<&FieldInfo> {
        self.id.map(|i| &self.fields[i])
    }

    /// The primary key field, or a configuration error if there is none.
    pub fn require_id(&self) -> Result<&FieldInfo> {
        self.id_field().ok_or_else(|| {
            ConfigError::MissingPrimaryKey {
                entity: self.entity_name,
            }
            .into()
        })
    }

    /// The optimistic-lock version field.
    pub fn version_field(&self) -> Option<&FieldInfo> {
        self.version.map(|i| &self.fields[i])
    }

    /// The soft-delete field.
    pub fn logic_delete_field(&self) -> Option<&FieldInfo> {
        self.logic_delete.map(|i| &self.fields[i])
    }

    /// Fields with a unique constraint.
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.unique.iter().map(|&i| &self.fields[i])
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    pub fn has_logic_delete(&self) -> bool {
        self.logic_delete.is_some()
    }

    pub fn has_unique_fields(&self) -> bool {
        !self.unique.is_empty()
    }

    /// Every field except the primary key.
    pub fn non_id_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| !f.primary_key)
    }

    /// Fields usable in SET clauses and criteria.
    pub fn plain_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.is_plain())
    }

    /// Look up a field by declared name.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Comma separated list of every mapped column.
    pub fn select_columns(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.column_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `deleted_column = <undeleted>`, if the table has a soft-delete field.
    pub fn logic_delete_predicate(&self) -> Option<String> {
        self.logic_delete_field()
            .map(|f| format!("{} = {}", f.column_name, f.undeleted_literal()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::LogicDelete;
    use crate::id::IdType;
    use crate::types::SqlType;

    fn article() -> TableInfo {
        TableInfo::new(
            TypeId::of::<()>(),
            "Article",
            "t_article",
            vec![
                FieldInfo::new("id", "id", SqlType::BigInt).primary_key(IdType::Auto),
                FieldInfo::new("title", "title", SqlType::Varchar).unique(true),
                FieldInfo::new("version", "version", SqlType::Integer).version(true),
                FieldInfo::new("deleted", "deleted", SqlType::Integer).logic_delete(LogicDelete::default()),
            ],
        )
    }

    #[test]
    fn roles_are_located() {
        let t = article();
        assert_eq!(t.id_field().map(|f| f.name), Some("id"));
        assert_eq!(t.version_field().map(|f| f.name), Some("version"));
        assert_eq!(t.logic_delete_field().map(|f| f.name), Some("deleted"));
        assert!(t.has_unique_fields());
        assert_eq!(t.unique_fields().count(), 1);
        assert_eq!(t.non_id_fields().count(), 3);
        assert_eq!(t.plain_fields().map(|f| f.name).collect::<Vec<_>>(), ["title"]);
    }

    #[test]
    fn select_columns_and_predicate() {
        let t = article();
        assert_eq!(t.select_columns(), "id, title, version, deleted");
        assert_eq!(t.logic_delete_predicate().as_deref(), Some("deleted = 0"));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let t = TableInfo::new(
            TypeId::of::<()>(),
            "Log",
            "t_log",
            vec![FieldInfo::new("msg", "msg", SqlType::Text)],
        );
        let err = t.require_id().unwrap_err();
        assert_eq!(
            err.as_config(),
            Some(&ConfigError::MissingPrimaryKey { entity: "Log" })
        );
    }
}
