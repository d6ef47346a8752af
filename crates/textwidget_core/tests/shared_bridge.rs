mod support;

use support::{FixedClock, ReadOnlyStore};
use textwidget_core::bridge::SqliteWidgetHost;
use textwidget_core::db::open_db_in_memory;
use textwidget_core::widget::provider::WidgetProvider;
use textwidget_core::{
    decode_snapshot, encode_snapshot, BridgeError, KeyValueStore, RefreshOutcome, SharedBridge,
    SharedStorageBridge, SqliteKeyValueStore, TextEntry, TextEntryList, UnavailableBridge,
    SAVED_TEXTS_KEY,
};

const SHARED_NS: &str = "com.ggg02.resetnativelocale.shared";

fn list_of(texts: &[&str]) -> TextEntryList {
    let mut list = TextEntryList::new();
    for (index, text) in texts.iter().enumerate() {
        list.push(TextEntry::new((index + 1).to_string(), *text).unwrap())
            .unwrap();
    }
    list
}

#[test]
fn publish_writes_wire_shape_under_saved_texts_key() {
    let conn = open_db_in_memory().unwrap();
    let bridge = SharedStorageBridge::new(
        SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap(),
        SqliteWidgetHost::new(&conn, SHARED_NS),
    );

    let report = bridge.publish(&list_of(&["a", "b"])).unwrap();
    assert_eq!(report.entry_count, 2);
    assert_eq!(report.refresh, RefreshOutcome::NoWidgets);

    let shared = SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap();
    let raw = shared.get(SAVED_TEXTS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{"id": "1", "text": "a"}, {"id": "2", "text": "b"}])
    );
}

#[test]
fn escaped_and_unicode_texts_round_trip_through_codec_and_publish() {
    let list = list_of(&[
        r#"dijo "hola""#,
        r"C:\temp\notas",
        "línea uno\nlínea dos",
        "  con espacios  ",
        "mañana, señor",
        "listo 🎉",
    ]);

    let encoded = encode_snapshot(&list).unwrap();
    assert_eq!(decode_snapshot(&encoded).unwrap(), list);

    let conn = open_db_in_memory().unwrap();
    let bridge = SharedStorageBridge::new(
        SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap(),
        SqliteWidgetHost::new(&conn, SHARED_NS),
    );
    bridge.publish(&list).unwrap();

    let shared = SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap();
    let raw = shared.get(SAVED_TEXTS_KEY).unwrap().unwrap();
    assert_eq!(decode_snapshot(&raw).unwrap(), list);
}

#[test]
fn publish_does_not_touch_primary_storage() {
    let app_conn = open_db_in_memory().unwrap();
    let shared_conn = open_db_in_memory().unwrap();
    let primary = SqliteKeyValueStore::try_new(&app_conn, "app.local").unwrap();
    primary.set(SAVED_TEXTS_KEY, "[]").unwrap();

    let bridge = SharedStorageBridge::new(
        SqliteKeyValueStore::try_new(&shared_conn, SHARED_NS).unwrap(),
        SqliteWidgetHost::new(&shared_conn, SHARED_NS),
    );
    bridge.publish(&list_of(&["a"])).unwrap();

    assert_eq!(primary.get(SAVED_TEXTS_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn publish_requests_refresh_for_attached_widgets() {
    let conn = open_db_in_memory().unwrap();
    let provider = WidgetProvider::try_new(&conn, SHARED_NS, 40).unwrap();
    provider.on_enabled(7).unwrap();
    provider.on_enabled(3).unwrap();

    let clock = FixedClock::at(1_000);
    let bridge = SharedStorageBridge::new(
        SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap(),
        SqliteWidgetHost::with_clock(&conn, SHARED_NS, &clock),
    );

    let report = bridge.publish(&list_of(&["a"])).unwrap();
    assert_eq!(report.refresh, RefreshOutcome::Requested(vec![3, 7]));

    let redrawn = provider.poll_refresh().unwrap();
    let ids: Vec<i64> = redrawn.iter().map(|w| w.widget_id).collect();
    assert_eq!(ids, [3, 7]);
    assert_eq!(redrawn[0].timeline.view.lines(), ["a"]);
}

#[test]
fn shared_write_failure_is_reported_as_write_failure() {
    let conn = open_db_in_memory().unwrap();
    let bridge = SharedStorageBridge::new(
        ReadOnlyStore { value: None },
        SqliteWidgetHost::new(&conn, SHARED_NS),
    );

    let err = bridge.publish(&list_of(&["a"])).unwrap_err();
    assert!(matches!(err, BridgeError::WriteFailure(_)));
}

#[test]
fn inspect_reports_state_without_mutating_it() {
    let conn = open_db_in_memory().unwrap();
    let provider = WidgetProvider::try_new(&conn, SHARED_NS, 40).unwrap();
    provider.on_enabled(12).unwrap();
    provider.on_enabled(4).unwrap();

    let bridge = SharedStorageBridge::new(
        SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap(),
        SqliteWidgetHost::new(&conn, SHARED_NS),
    );
    bridge.publish(&list_of(&["a", "b", "c", "d"])).unwrap();
    provider.poll_refresh().unwrap();

    let shared = SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap();
    let before = shared.get(SAVED_TEXTS_KEY).unwrap();

    let info = bridge.inspect().unwrap();
    assert_eq!(info.widget_ids, "4, 12");
    assert_eq!(info.widget_count, 2);
    assert_eq!(info.entry_count, 4);
    assert_eq!(info.parsed_texts, "Total: 4, Ejemplos: a, b, c");
    assert_eq!(Some(info.saved_texts_raw.clone()), before);
    assert_eq!(info.next_update_time.len(), 8);

    assert_eq!(shared.get(SAVED_TEXTS_KEY).unwrap(), before);
    assert!(provider.poll_refresh().unwrap().is_empty());
}

#[test]
fn inspect_defaults_absent_snapshot_to_empty_array() {
    let conn = open_db_in_memory().unwrap();
    let bridge = SharedStorageBridge::new(
        SqliteKeyValueStore::try_new(&conn, SHARED_NS).unwrap(),
        SqliteWidgetHost::new(&conn, SHARED_NS),
    );

    let info = bridge.inspect().unwrap();
    assert_eq!(info.saved_texts_raw, "[]");
    assert_eq!(info.entry_count, 0);
    assert_eq!(info.widget_count, 0);
    assert_eq!(info.widget_ids, "");
    assert_eq!(info.parsed_texts, "Total: 0, Ejemplos: ");
}

#[test]
fn unavailable_bridge_is_a_reported_no_op() {
    let bridge = UnavailableBridge;
    assert!(matches!(
        bridge.publish(&list_of(&["a"])),
        Err(BridgeError::PlatformUnavailable)
    ));
    assert!(matches!(
        bridge.inspect(),
        Err(BridgeError::PlatformUnavailable)
    ));
}
