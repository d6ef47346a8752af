use textwidget_core::db::open_db_in_memory;
use textwidget_core::{KeyValueStore, SqliteKeyValueStore, StoreError};

#[test]
fn set_overwrites_and_get_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn, "app.local").unwrap();

    assert_eq!(store.get("savedTexts").unwrap(), None);
    store.set("savedTexts", "[]").unwrap();
    store.set("savedTexts", r#"[{"id":"1","text":"a"}]"#).unwrap();
    assert_eq!(
        store.get("savedTexts").unwrap().as_deref(),
        Some(r#"[{"id":"1","text":"a"}]"#)
    );
}

#[test]
fn namespaces_are_isolated_within_one_file() {
    let conn = open_db_in_memory().unwrap();
    let primary = SqliteKeyValueStore::try_new(&conn, "app.local").unwrap();
    let shared = SqliteKeyValueStore::try_new(&conn, "group.shared").unwrap();

    primary.set("savedTexts", "primary").unwrap();
    assert_eq!(shared.get("savedTexts").unwrap(), None);

    shared.set("savedTexts", "shared").unwrap();
    assert_eq!(primary.get("savedTexts").unwrap().as_deref(), Some("primary"));
}

#[test]
fn remove_reports_whether_a_value_existed() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn, "app.local").unwrap();

    store.set("k", "v").unwrap();
    assert!(store.remove("k").unwrap());
    assert!(!store.remove("k").unwrap());
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn rejects_blank_namespace_and_key() {
    let conn = open_db_in_memory().unwrap();
    assert!(matches!(
        SqliteKeyValueStore::try_new(&conn, "  "),
        Err(StoreError::InvalidNamespace(_))
    ));
    assert!(matches!(
        SqliteKeyValueStore::try_new(&conn, " padded "),
        Err(StoreError::InvalidNamespace(_))
    ));

    let store = SqliteKeyValueStore::try_new(&conn, "app.local").unwrap();
    assert!(matches!(store.set(" ", "v"), Err(StoreError::InvalidKey(_))));
}
