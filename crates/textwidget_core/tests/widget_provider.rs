use textwidget_core::db::open_db_in_memory;
use textwidget_core::repo::widget_repo::SqliteWidgetRepository;
use textwidget_core::widget::provider::WidgetProvider;
use textwidget_core::{KeyValueStore, SqliteKeyValueStore, SAVED_TEXTS_KEY};

const SHARED_NS: &str = "group.textwidget.shared";

#[test]
fn enable_and_disable_track_instances() {
    let conn = open_db_in_memory().unwrap();
    let provider = WidgetProvider::try_new(&conn, SHARED_NS, 40).unwrap();
    let widgets = SqliteWidgetRepository::new(&conn, SHARED_NS);

    provider.on_enabled(5).unwrap();
    provider.on_enabled(5).unwrap();
    provider.on_enabled(2).unwrap();
    assert_eq!(widgets.widget_ids().unwrap(), [2, 5]);

    assert!(provider.on_disabled(5).unwrap());
    assert!(!provider.on_disabled(5).unwrap());
    assert_eq!(widgets.widget_ids().unwrap(), [2]);
}

#[test]
fn on_update_renders_each_requested_instance() {
    let conn = open_db_in_memory().unwrap();
    SqliteKeyValueStore::try_new(&conn, SHARED_NS)
        .unwrap()
        .set(SAVED_TEXTS_KEY, r#"[{"id":"1","text":"x"}]"#)
        .unwrap();
    let provider = WidgetProvider::try_new(&conn, SHARED_NS, 40).unwrap();

    let rendered = provider.on_update(&[10, 11]);
    assert_eq!(rendered.len(), 2);
    assert!(rendered.iter().all(|w| w.timeline.view.lines() == ["x"]));
}

#[test]
fn poll_refresh_coalesces_requests_and_skips_detached_widgets() {
    let conn = open_db_in_memory().unwrap();
    let provider = WidgetProvider::try_new(&conn, SHARED_NS, 40).unwrap();
    let widgets = SqliteWidgetRepository::new(&conn, SHARED_NS);
    provider.on_enabled(1).unwrap();
    provider.on_enabled(2).unwrap();

    widgets.enqueue_refresh(&[1, 2], 100).unwrap();
    widgets.enqueue_refresh(&[2, 9], 200).unwrap();
    assert_eq!(widgets.pending_refresh_count().unwrap(), 2);

    let rendered = provider.poll_refresh().unwrap();
    let ids: Vec<i64> = rendered.iter().map(|w| w.widget_id).collect();
    assert_eq!(ids, [1, 2]);
    assert_eq!(widgets.pending_refresh_count().unwrap(), 0);
    assert!(provider.poll_refresh().unwrap().is_empty());
}

#[test]
fn refresh_queues_are_scoped_by_namespace() {
    let conn = open_db_in_memory().unwrap();
    let ours = SqliteWidgetRepository::new(&conn, SHARED_NS);
    let theirs = SqliteWidgetRepository::new(&conn, "other.shared");

    theirs.enqueue_refresh(&[1], 100).unwrap();
    assert_eq!(ours.pending_refresh_count().unwrap(), 0);
    assert!(ours.drain_refresh().unwrap().is_empty());
    assert_eq!(theirs.drain_refresh().unwrap()[0].widget_ids, [1]);
}
