//! FFI use-case API for the app shell and the widget extension.
//!
//! # Responsibility
//! - Expose saved-text and widget use cases to Dart via FRB.
//! - Open storage per call; the Rust side keeps no cached list.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Failures are returned as `ok=false` envelopes with a message.
//! - Shared-storage trouble never fails a saved-text mutation.

use log::warn;
use std::path::Path;
use std::sync::OnceLock;
use textwidget_core::config::PRIMARY_NAMESPACE;
use textwidget_core::db::open_db;
use textwidget_core::widget::renderer::WIDGET_TITLE;
use textwidget_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    ping as ping_inner, AppScreen, EmptyReason, Notice, PublishReport, RefreshOutcome, SharedBridge,
    SharedStorageBridge, SqliteKeyValueStore, SqliteWidgetHost, StorageConfig, TextEntryList,
    UnavailableBridge, WidgetProvider, WidgetTimeline, WidgetView,
};

static STORAGE_CONFIG: OnceLock<StorageConfig> = OnceLock::new();

type Screen<'conn> = AppScreen<SqliteKeyValueStore<'conn>, Box<dyn SharedBridge + 'conn>>;

/// Health check.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success, the error message otherwise.
/// Repeating the same `level + log_dir` is a no-op. A blank `level` falls
/// back to the build's default level.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match level.trim() {
        "" => default_log_level(),
        level => level,
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Points storage at the app's private dir and the app-group container.
///
/// Must be called before any other storage call to take effect; later
/// calls must repeat the active config. Returns an empty string on
/// success, the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(
    data_dir: String,
    shared_dir: String,
    shared_namespace: Option<String>,
) -> String {
    let data_dir = data_dir.trim();
    let shared_dir = shared_dir.trim();
    for (name, dir) in [("data_dir", data_dir), ("shared_dir", shared_dir)] {
        if dir.is_empty() || !Path::new(dir).is_absolute() {
            return format!("{name} must be an absolute path, got `{dir}`");
        }
    }

    let mut config = StorageConfig::in_dirs(data_dir, shared_dir);
    if let Some(namespace) = shared_namespace
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        config = config.with_namespace(namespace);
    }

    let active = STORAGE_CONFIG.get_or_init(|| config.clone());
    if *active == config {
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.primary_db_path.display(),
            config.primary_db_path.display()
        )
    }
}

/// One saved snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub id: String,
    pub text: String,
}

/// Saved-text list envelope returned by every list use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextsResponse {
    /// Whether the primary list operation succeeded.
    pub ok: bool,
    /// Current list in display order.
    pub items: Vec<TextItem>,
    /// Whether the shared copy was written.
    pub published: bool,
    /// Widget instances asked to redraw.
    pub refreshed_widget_ids: Vec<i64>,
    /// Human-readable diagnostics/UI message.
    pub message: String,
}

/// Diagnostic envelope mirroring the platform widget info query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetInfoResponse {
    pub ok: bool,
    pub widget_ids: String,
    pub widget_count: u32,
    pub saved_texts_raw: String,
    pub parsed_texts: String,
    pub next_update_time: String,
    pub message: String,
}

/// What the widget draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRenderResponse {
    pub title: String,
    /// Entry lines plus the overflow line, or the placeholder alone.
    pub lines: Vec<String>,
    pub is_empty: bool,
    pub overflow_count: u32,
    pub next_refresh_at_ms: i64,
}

/// Widgets redrawn by a refresh poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRefreshResponse {
    pub ok: bool,
    pub widget_ids: Vec<i64>,
    pub render: Option<WidgetRenderResponse>,
    pub message: String,
}

/// Generic widget lifecycle envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetActionResponse {
    pub ok: bool,
    pub message: String,
}

/// Loads the persisted list (empty on missing or unreadable data).
#[flutter_rust_bridge::frb(sync)]
pub fn texts_load() -> TextsResponse {
    match with_screen(|screen| screen.entries().clone()) {
        Ok(entries) => TextsResponse::listed(&entries, "Loaded."),
        Err(err) => TextsResponse::failure(format!("texts_load failed: {err}")),
    }
}

/// Appends one snippet and publishes it to the widget area.
///
/// Blank input is accepted as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn texts_add(text: String) -> TextsResponse {
    let message = if text.trim().is_empty() {
        "Nothing to save."
    } else {
        "Text saved."
    };
    let outcome = with_screen(|screen| {
        screen.set_input(text);
        screen
            .submit()
            .map(|update| (update, screen.take_notice()))
            .map_err(|err| err.to_string())
    });
    match outcome {
        Ok(Ok((update, notice))) => {
            TextsResponse::mutated(&update.entries, update.published, notice, message)
        }
        Ok(Err(err)) | Err(err) => TextsResponse::failure(format!("texts_add failed: {err}")),
    }
}

/// Clears every snippet and publishes the empty list.
///
/// The shell shows its own confirmation dialog before calling this.
#[flutter_rust_bridge::frb(sync)]
pub fn texts_clear() -> TextsResponse {
    let outcome = with_screen(|screen| {
        screen.request_clear();
        screen
            .confirm_clear()
            .map(|update| (update, screen.take_notice()))
            .map_err(|err| err.to_string())
    });
    match outcome {
        Ok(Ok((update, notice))) => {
            TextsResponse::mutated(&update.entries, update.published, notice, "All texts cleared.")
        }
        Ok(Err(err)) | Err(err) => TextsResponse::failure(format!("texts_clear failed: {err}")),
    }
}

/// Manually re-publishes the current list ("force widget refresh").
#[flutter_rust_bridge::frb(sync)]
pub fn widget_republish() -> TextsResponse {
    let outcome = with_screen(|screen| {
        let published = screen.republish();
        (screen.entries().clone(), published, screen.take_notice())
    });
    match outcome {
        Ok((entries, published, notice)) => {
            TextsResponse::mutated(&entries, published, notice, "Widget refresh requested.")
        }
        Err(err) => TextsResponse::failure(format!("widget_republish failed: {err}")),
    }
}

/// Read-only widget diagnostics.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_info() -> WidgetInfoResponse {
    let outcome = with_screen(|screen| match screen.diagnostics() {
        Some(info) => Ok(info),
        None => Err(notice_message(screen.take_notice())),
    });
    match outcome {
        Ok(Ok(info)) => WidgetInfoResponse {
            ok: true,
            widget_ids: info.widget_ids,
            widget_count: info.widget_count,
            saved_texts_raw: info.saved_texts_raw,
            parsed_texts: info.parsed_texts,
            next_update_time: info.next_update_time,
            message: "OK".to_string(),
        },
        Ok(Err(err)) | Err(err) => WidgetInfoResponse {
            ok: false,
            widget_ids: String::new(),
            widget_count: 0,
            saved_texts_raw: String::new(),
            parsed_texts: String::new(),
            next_update_time: String::new(),
            message: format!("widget_info failed: {err}"),
        },
    }
}

/// Renders the widget from shared storage (widget extension side).
///
/// Never fails: storage trouble renders the error placeholder.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_render() -> WidgetRenderResponse {
    match with_provider(|provider| provider.snapshot()) {
        Ok(timeline) => to_render_response(&timeline),
        Err(err) => {
            warn!("event=ffi_widget_render module=ffi status=degraded error={err}");
            to_render_response(&WidgetTimeline {
                view: WidgetView::Empty {
                    reason: EmptyReason::LoadError,
                },
                rendered_at_ms: 0,
                next_refresh_at_ms: 0,
            })
        }
    }
}

/// Registers an installed widget instance.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_attach(widget_id: i64) -> WidgetActionResponse {
    match with_provider(|provider| provider.on_enabled(widget_id).map_err(|e| e.to_string())) {
        Ok(Ok(())) => WidgetActionResponse::success(format!("Widget {widget_id} attached.")),
        Ok(Err(err)) | Err(err) => {
            WidgetActionResponse::failure(format!("widget_attach failed: {err}"))
        }
    }
}

/// Forgets a removed widget instance.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_detach(widget_id: i64) -> WidgetActionResponse {
    match with_provider(|provider| provider.on_disabled(widget_id).map_err(|e| e.to_string())) {
        Ok(Ok(true)) => WidgetActionResponse::success(format!("Widget {widget_id} detached.")),
        Ok(Ok(false)) => {
            WidgetActionResponse::success(format!("Widget {widget_id} was not attached."))
        }
        Ok(Err(err)) | Err(err) => {
            WidgetActionResponse::failure(format!("widget_detach failed: {err}"))
        }
    }
}

/// Drains refresh requests queued by publishes and renders once for the
/// instances they name.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_poll_refresh() -> WidgetRefreshResponse {
    match with_provider(|provider| provider.poll_refresh().map_err(|e| e.to_string())) {
        Ok(Ok(rendered)) => WidgetRefreshResponse {
            ok: true,
            widget_ids: rendered.iter().map(|widget| widget.widget_id).collect(),
            render: rendered
                .first()
                .map(|widget| to_render_response(&widget.timeline)),
            message: format!("{} widget(s) redrawn.", rendered.len()),
        },
        Ok(Err(err)) | Err(err) => WidgetRefreshResponse {
            ok: false,
            widget_ids: Vec::new(),
            render: None,
            message: format!("widget_poll_refresh failed: {err}"),
        },
    }
}

impl TextsResponse {
    fn listed(entries: &TextEntryList, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            items: to_text_items(entries),
            published: false,
            refreshed_widget_ids: Vec::new(),
            message: message.into(),
        }
    }

    fn mutated(
        entries: &TextEntryList,
        published: Option<PublishReport>,
        notice: Option<Notice>,
        message: &str,
    ) -> Self {
        let refreshed_widget_ids = match published.as_ref().map(|report| &report.refresh) {
            Some(RefreshOutcome::Requested(ids)) => ids.clone(),
            _ => Vec::new(),
        };
        let message = match notice {
            Some(notice) => format!("{message} {}", notice_message(Some(notice))),
            None => message.to_string(),
        };
        Self {
            ok: true,
            items: to_text_items(entries),
            published: published.is_some(),
            refreshed_widget_ids,
            message,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            published: false,
            refreshed_widget_ids: Vec::new(),
            message,
        }
    }
}

impl WidgetActionResponse {
    fn success(message: String) -> Self {
        Self { ok: true, message }
    }

    fn failure(message: String) -> Self {
        Self { ok: false, message }
    }
}

fn storage_config() -> &'static StorageConfig {
    STORAGE_CONFIG.get_or_init(StorageConfig::from_env)
}

/// Opens both storage areas and runs `f` on a freshly mounted screen.
///
/// An unopenable shared area degrades to [`UnavailableBridge`] so saved-text
/// operations keep working.
fn with_screen<T>(f: impl FnOnce(&mut Screen<'_>) -> T) -> Result<T, String> {
    let config = storage_config();
    let app_conn = open_db(&config.primary_db_path)
        .map_err(|err| format!("primary storage open failed: {err}"))?;
    let primary = SqliteKeyValueStore::try_new(&app_conn, PRIMARY_NAMESPACE)
        .map_err(|err| err.to_string())?;

    let shared_conn = match open_db(&config.shared_db_path) {
        Ok(conn) => Some(conn),
        Err(err) => {
            warn!("event=ffi_shared_open module=ffi status=degraded error={err}");
            None
        }
    };
    let bridge: Box<dyn SharedBridge + '_> = match shared_conn.as_ref() {
        Some(conn) => match SqliteKeyValueStore::try_new(conn, config.shared_namespace.clone()) {
            Ok(shared) => Box::new(SharedStorageBridge::new(
                shared,
                SqliteWidgetHost::new(conn, config.shared_namespace.clone()),
            )),
            Err(err) => {
                warn!("event=ffi_shared_open module=ffi status=degraded error={err}");
                Box::new(UnavailableBridge)
            }
        },
        None => Box::new(UnavailableBridge),
    };

    let mut screen = AppScreen::open(primary, bridge);
    Ok(f(&mut screen))
}

fn with_provider<T>(f: impl FnOnce(&WidgetProvider<'_>) -> T) -> Result<T, String> {
    let config = storage_config();
    let conn = open_db(&config.shared_db_path)
        .map_err(|err| format!("shared storage open failed: {err}"))?;
    let provider = WidgetProvider::try_new(&conn, &config.shared_namespace, config.line_width)
        .map_err(|err| err.to_string())?;
    Ok(f(&provider))
}

fn to_text_items(entries: &TextEntryList) -> Vec<TextItem> {
    entries
        .iter()
        .map(|entry| TextItem {
            id: entry.id.clone(),
            text: entry.text.clone(),
        })
        .collect()
}

fn to_render_response(timeline: &WidgetTimeline) -> WidgetRenderResponse {
    WidgetRenderResponse {
        title: WIDGET_TITLE.to_string(),
        lines: timeline.view.lines(),
        is_empty: timeline.view.is_empty(),
        overflow_count: u32::try_from(timeline.view.overflow_count()).unwrap_or(u32::MAX),
        next_refresh_at_ms: timeline.next_refresh_at_ms,
    }
}

fn notice_message(notice: Option<Notice>) -> String {
    match notice {
        Some(Notice::Info(message)) | Some(Notice::Warning(message)) => message,
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_storage, core_version, init_logging, ping, storage_config, texts_add,
        texts_clear, texts_load, widget_attach, widget_detach, widget_info, widget_render,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn init_logging_defaults_blank_level() {
        assert_eq!(
            init_logging("  ".to_string(), String::new()),
            "log_dir cannot be empty"
        );
    }

    #[test]
    fn configure_storage_rejects_relative_and_conflicting_paths() {
        let error = configure_storage("data".to_string(), "/shared".to_string(), None);
        assert!(error.contains("data_dir"));

        let active = storage_config();
        let data_dir = active.primary_db_path.parent().unwrap().to_str().unwrap();
        let shared_dir = active.shared_db_path.parent().unwrap().to_str().unwrap();
        assert_eq!(
            configure_storage(
                data_dir.to_string(),
                shared_dir.to_string(),
                Some(active.shared_namespace.clone()),
            ),
            ""
        );

        let conflict = configure_storage(
            "/definitely/elsewhere".to_string(),
            shared_dir.to_string(),
            None,
        );
        assert!(conflict.contains("refusing to switch"));
    }

    #[test]
    fn texts_add_returns_new_item_and_skips_blank_input() {
        let token = unique_token("add");
        let response = texts_add(token.clone());
        assert!(response.ok, "{}", response.message);
        assert!(response.items.iter().any(|item| item.text == token));

        let blank = texts_add("   ".to_string());
        assert!(blank.ok, "{}", blank.message);
        assert!(blank.items.iter().all(|item| !item.text.trim().is_empty()));

        assert!(texts_load().ok);
    }

    #[test]
    fn publish_after_add_targets_attached_widget() {
        let widget_id = unique_widget_id();
        assert!(widget_attach(widget_id).ok);

        let response = texts_add(unique_token("publish"));
        assert!(response.ok, "{}", response.message);
        assert!(response.published);
        assert!(response.refreshed_widget_ids.contains(&widget_id));

        let info = widget_info();
        assert!(info.ok, "{}", info.message);
        assert!(info.widget_ids.contains(&widget_id.to_string()));
        assert!(info.parsed_texts.starts_with("Total: "));

        assert!(widget_detach(widget_id).ok);
    }

    #[test]
    fn texts_clear_returns_empty_list() {
        texts_add(unique_token("clear"));
        let response = texts_clear();
        assert!(response.ok, "{}", response.message);
        assert!(response.items.is_empty());
    }

    #[test]
    fn widget_render_always_has_title_and_lines() {
        let render = widget_render();
        assert_eq!(render.title, "Textos guardados:");
        assert!(!render.lines.is_empty());
        assert!(render.lines.len() <= 4);
    }

    fn unique_token(prefix: &str) -> String {
        format!("{prefix}-{}", nanos())
    }

    fn unique_widget_id() -> i64 {
        1_000_000 + i64::try_from(nanos() % 1_000_000_000).expect("fits in i64")
    }

    fn nanos() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos()
    }
}
