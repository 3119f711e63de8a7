//! Entity metadata resolution with a process-wide cache.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::entity::{Entity, EntityDef, FieldDef};
use crate::error::{ConfigError, Result};
use crate::field::FieldInfo;
use crate::naming::{camel_to_snake, is_valid_identifier};
use crate::table::TableInfo;

type Cache = RwLock<HashMap<TypeId, Arc<TableInfo>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolve the table descriptor of `E`.
///
/// Repeated calls return the same `Arc`. Two threads racing on an uncached type
/// may both build a descriptor, but only the first one stored is ever returned.
pub fn resolve<E: Entity>() -> Result<Arc<TableInfo>> {
    let key = TypeId::of::<E>();
    if let Some(hit) = cache().read().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return Ok(Arc::clone(hit));
    }

    let built = Arc::new(build(&E::definition())?);
    let mut guard = cache().write().unwrap_or_else(PoisonError::into_inner);
    let entry = guard.entry(key).or_insert(built);
    Ok(Arc::clone(entry))
}

/// Drop every cached descriptor.
pub fn clear_cache() {
    cache().write().unwrap_or_else(PoisonError::into_inner).clear();
}

/// Build a descriptor from a definition without touching the cache.
pub fn build(def: &EntityDef) -> Result<TableInfo> {
    let entity = def.type_name;
    let table = def.table.ok_or(ConfigError::MissingTable { entity })?;
    check_identifier(table)?;

    // Walk most-derived first so descendants claim names before ancestors.
    let mut claimed = HashSet::new();
    let mut levels: Vec<Vec<&FieldDef>> = Vec::new();
    for level in def.lineage() {
        let mut kept = Vec::new();
        for field in &level.fields {
            if !claimed.insert(field.name) || field.ignore {
                continue;
            }
            kept.push(field);
        }
        levels.push(kept);
    }

    let mut fields = Vec::new();
    let mut roles = Roles::default();
    for field in levels.into_iter().rev().flatten() {
        let info = to_field_info(field)?;
        roles.claim(entity, &info)?;
        fields.push(info);
    }

    tracing::debug!(entity, table, fields = fields.len(), "Resolved entity metadata");
    Ok(TableInfo::new(def.type_id, entity, table, fields))
}

fn to_field_info(field: &FieldDef) -> Result<FieldInfo> {
    let column = field
        .column
        .map_or_else(|| camel_to_snake(field.name), str::to_string);
    check_identifier(&column)?;

    let mut info = FieldInfo::new(field.name, column, field.sql_type)
        .wire_type(field.wire_type)
        .version(field.version)
        .unique(field.unique);
    if let Some(strategy) = field.id {
        info = info.primary_key(strategy);
    }
    if let Some(sentinels) = field.deleted {
        info = info.logic_delete(sentinels);
    }
    Ok(info)
}

fn check_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            name: name.to_string(),
        }
        .into())
    }
}

#[derive(Default)]
struct Roles {
    id: Option<&'static str>,
    version: Option<&'static str>,
    deleted: Option<&'static str>,
}

impl Roles {
    fn claim(&mut self, entity: &'static str, field: &FieldInfo) -> Result<()> {
        if field.primary_key {
            claim_role(&mut self.id, entity, "primary key", field.name)?;
        }
        if field.version {
            claim_role(&mut self.version, entity, "version", field.name)?;
        }
        if field.is_logic_delete() {
            claim_role(&mut self.deleted, entity, "soft-delete", field.name)?;
        }
        Ok(())
    }
}

fn claim_role(
    slot: &mut Option<&'static str>,
    entity: &'static str,
    role: &'static str,
    name: &'static str,
) -> Result<()> {
    match slot {
        Some(first) => Err(ConfigError::DuplicateRole {
            entity,
            role,
            first: (*first).to_string(),
            second: name.to_string(),
        }
        .into()),
        None => {
            *slot = Some(name);
            Ok(())
        }
    }
}
