mod common;

use common::SqliteExecutor;
use sqlmapper::prelude::*;

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[entity(table = "t_item")]
struct Item {
    #[entity(id)]
    id: Option<i64>,
    name: Option<String>,
    category: Option<String>,
    #[entity(deleted)]
    deleted: Option<i32>,
}

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[entity(table = "t_missing")]
struct Ghost {
    #[entity(id)]
    id: Option<i64>,
}

const SCHEMA: &str = "
    CREATE TABLE t_item (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        category TEXT,
        deleted INTEGER NOT NULL DEFAULT 0
    );
";

/// 23 live items (odd ids in category "odd") plus one soft-deleted item.
fn seeded() -> SqliteExecutor {
    let mut db = SqliteExecutor::with_schema(SCHEMA);
    let mut items: Vec<Item> = (1..=24)
        .map(|i| Item {
            name: Some(format!("item-{i:02}")),
            category: Some(if i % 2 == 1 { "odd" } else { "even" }.to_string()),
            ..Item::default()
        })
        .collect();
    let mut mapper = BaseMapper::<Item, _>::new(&mut db);
    mapper.insert_batch(&mut items).expect("seed items");
    mapper.delete_by_id(items[23].id).expect("soft delete last item");
    db
}

#[test]
fn sqlite_pages_through_23_rows() {
    let mut db = seeded();
    let mut mapper = BaseMapper::<Item, _>::new(&mut db);

    for current in 1..=2 {
        let page = mapper.page(Page::new(current, 10), None).expect("page");
        assert_eq!(page.records().len(), 10);
        assert_eq!(page.total(), 23);
        assert_eq!(page.pages(), 3);
    }

    let third = mapper.page(Page::new(3, 10), None).expect("page 3");
    assert_eq!(third.records().len(), 3);
    assert_eq!(third.total(), 23);
    assert!(!third.has_next());

    let past_end = mapper.page(Page::new(4, 10), None).expect("page 4");
    assert!(past_end.records().is_empty());
    assert_eq!(past_end.total(), 23);
}

#[test]
fn sqlite_overflow_guard_skips_page_query() {
    let mut db = seeded();
    let config = PaginationConfig::new().overflow(true);
    let executed = {
        let mut mapper = BaseMapper::<Item, _>::with_config(&mut db, config);
        let page = mapper.page(Page::new(4, 10), None).expect("page 4");
        assert!(page.records().is_empty());
        assert_eq!(page.total(), 23);
        mapper.executor().log.len()
    };
    assert!(db.log[executed - 1].starts_with("SELECT COUNT(*) FROM ("));
}

#[test]
fn sqlite_pages_respect_criteria_and_order() {
    let mut db = seeded();
    let mut mapper = BaseMapper::<Item, _>::new(&mut db);
    let odd = Item {
        category: Some("odd".into()),
        ..Item::default()
    };

    let page = mapper
        .page(Page::new(1, 5).order_by("name", false), Some(&odd))
        .expect("ordered page");
    assert_eq!(page.total(), 12);
    let names: Vec<&str> = page
        .records()
        .iter()
        .filter_map(|i| i.name.as_deref())
        .collect();
    assert_eq!(names, ["item-23", "item-21", "item-19", "item-17", "item-15"]);

    let err = mapper
        .page(Page::new(1, 5).order_by("name; DROP TABLE t_item", true), None)
        .expect_err("rejected order by");
    assert!(err.is_config());
}

#[test]
fn sqlite_page_helper_paginates_plain_queries() {
    let mut db = seeded();
    let mut mapper = BaseMapper::<Item, _>::new(&mut db);

    let page = PageHelper::page(2, 10, || mapper.select_list(None)).expect("ambient page");
    assert_eq!(page.records().len(), 10);
    assert_eq!(page.total(), 23);
    assert_eq!(page.current(), 2);
    assert!(PageHelper::local_page().is_none());

    // Explicit pages win over the ambient one.
    let explicit = PageHelper::page(1, 5, || {
        mapper
            .page(Page::new(3, 10), None)
            .map(Page::into_records)
    })
    .expect("explicit inside ambient");
    assert_eq!(explicit.records().len(), 3);

    assert_eq!(mapper.select_list(None).expect("unpaged").len(), 23);
}

#[test]
fn sqlite_page_helper_pages_capped_selects() {
    let mut db = seeded();
    let mut mapper = BaseMapper::<Item, _>::new(&mut db);

    let page = PageHelper::page(1, 5, || mapper.select_all()).expect("select_all under a page");
    assert_eq!(page.records().len(), 5);
    assert_eq!(page.total(), 23);

    let last = PageHelper::page(5, 5, || mapper.select_all()).expect("last page");
    assert_eq!(last.records().len(), 3);

    let odd = Item {
        category: Some("odd".into()),
        ..Item::default()
    };
    let one = PageHelper::page(1, 10, || {
        mapper
            .select_one(Some(&odd))
            .map(|found| found.into_iter().collect::<Vec<_>>())
    })
    .expect("select_one under a page");
    assert_eq!(one.total(), 1);
    assert_eq!(one.records().len(), 1);
}

#[test]
fn sqlite_page_helper_cleans_up_after_errors() {
    let mut db = seeded();
    let result = {
        let mut ghosts = BaseMapper::<Ghost, _>::new(&mut db);
        PageHelper::page(1, 10, || ghosts.select_list(None))
    };
    let err = result.expect_err("missing table");
    match err {
        Error::CountQuery { statement, .. } => assert_eq!(statement, "Ghost.select_list"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(PageHelper::local_page().is_none());

    let mut mapper = BaseMapper::<Item, _>::new(&mut db);
    assert_eq!(mapper.select_list(None).expect("unpaged").len(), 23);
}

#[test]
fn sqlite_invalid_page_is_a_config_error() {
    let mut db = seeded();
    let mut mapper = BaseMapper::<Item, _>::new(&mut db);
    let mut page: Page<()> = serde_json::from_str(r#"{"current":1,"size":0}"#).expect("page json");
    let err = mapper.select_page(&mut page, None).expect_err("size 0");
    assert_eq!(
        err.as_config(),
        Some(&ConfigError::InvalidPage {
            what: "page size",
            value: 0,
        })
    );
}
