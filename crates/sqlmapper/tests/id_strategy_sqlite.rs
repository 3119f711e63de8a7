mod common;

use std::collections::HashSet;

use common::SqliteExecutor;
use sqlmapper::prelude::*;

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[entity(table = "t_device")]
struct Device {
    #[entity(id = "uuid")]
    id: Option<String>,
    name: Option<String>,
}

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[entity(table = "t_order")]
struct Order {
    #[entity(id = "snowflake")]
    id: Option<i64>,
    #[entity(column = "order_no")]
    number: Option<String>,
    #[entity(ignore)]
    scratch: Option<String>,
}

/// Columns every audited table shares.
#[derive(Entity, Debug, Default, Clone, PartialEq)]
struct Audited {
    #[entity(id)]
    id: Option<i64>,
    created_by: Option<String>,
    #[entity(deleted = "Y", undeleted = "N")]
    removed: Option<String>,
}

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[entity(table = "t_document")]
struct Document {
    #[entity(parent)]
    base: Audited,
    title: Option<String>,
}

const SCHEMA: &str = "
    CREATE TABLE t_device (id TEXT PRIMARY KEY, name TEXT);
    CREATE TABLE t_order (id INTEGER PRIMARY KEY, order_no TEXT);
    CREATE TABLE t_document (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_by TEXT,
        removed TEXT NOT NULL,
        title TEXT
    );
";

#[test]
fn sqlite_uuid_batch_keeps_preset_ids() {
    let mut db = SqliteExecutor::with_schema(SCHEMA);
    let mut mapper = BaseMapper::<Device, _>::new(&mut db);

    let preset = ["preset-a", "preset-b"];
    let mut devices: Vec<Device> = (0..5)
        .map(|i| Device {
            id: preset.get(i).map(|s| (*s).to_string()),
            name: Some(format!("device-{i}")),
        })
        .collect();
    assert_eq!(mapper.insert_batch(&mut devices).expect("insert batch"), 5);

    let ids: HashSet<String> = devices.iter().filter_map(|d| d.id.clone()).collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(devices[0].id.as_deref(), Some("preset-a"));
    assert_eq!(devices[1].id.as_deref(), Some("preset-b"));
    for generated in &devices[2..] {
        let id = generated.id.as_deref().expect("generated id");
        assert!(uuid::Uuid::parse_str(id).is_ok(), "{id} is not a uuid");
    }

    let stored = mapper.select_all().expect("select all");
    assert_eq!(stored.len(), 5);

    let mut single = Device {
        id: Some("preset-c".into()),
        name: None,
    };
    mapper.insert(&mut single).expect("insert");
    assert_eq!(single.id.as_deref(), Some("preset-c"));
}

#[test]
fn sqlite_snowflake_ids_are_unique_and_increasing() {
    let mut db = SqliteExecutor::with_schema(SCHEMA);
    let mut mapper = BaseMapper::<Order, _>::new(&mut db);

    let mut orders: Vec<Order> = (0..50)
        .map(|i| Order {
            number: Some(format!("NO-{i}")),
            scratch: Some("not stored".into()),
            ..Order::default()
        })
        .collect();
    mapper.insert_batch(&mut orders).expect("insert batch");

    let ids: Vec<i64> = orders.iter().map(|o| o.id.expect("snowflake id")).collect();
    assert!(ids.iter().all(|id| *id > 0));
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let fetched = mapper.get_by_id(ids[7]).expect("get").expect("row");
    assert_eq!(fetched.number.as_deref(), Some("NO-7"));
    assert_eq!(fetched.scratch, None);
}

#[test]
fn sqlite_inherited_fields_map_through_parent() {
    let mut db = SqliteExecutor::with_schema(SCHEMA);
    let table = Document::table_info().expect("resolve");
    assert_eq!(table.select_columns(), "id, created_by, removed, title");

    let mut mapper = BaseMapper::<Document, _>::new(&mut db);
    let mut doc = Document {
        base: Audited {
            created_by: Some("dana".into()),
            ..Audited::default()
        },
        title: Some("Quarterly report".into()),
    };
    mapper.insert(&mut doc).expect("insert");
    assert!(doc.base.id.is_some());
    assert_eq!(doc.base.removed.as_deref(), Some("N"));

    let stored = mapper.get_by_id(doc.base.id).expect("get").expect("row");
    assert_eq!(stored, doc);

    assert_eq!(mapper.delete_by_id(doc.base.id).expect("delete"), 1);
    assert!(mapper.get_by_id(doc.base.id).expect("get").is_none());
    assert!(
        db.log
            .iter()
            .any(|sql| sql == "UPDATE t_document SET removed = 'Y' WHERE id = ? AND removed = 'N'")
    );
}

#[test]
fn sqlite_unmarked_entity_cannot_resolve() {
    let err = Audited::table_info().expect_err("no table marker");
    assert_eq!(
        err.as_config(),
        Some(&ConfigError::MissingTable { entity: "Audited" })
    );
}
