//! Core of the saved-texts widget app.
//!
//! Owns the `savedTexts` data contract and the publish-after-mutation
//! discipline between the app process and its home-screen widgets.

pub mod bridge;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod screen;
pub mod service;
pub mod widget;

pub use bridge::{
    BridgeError, PublishReport, RefreshOutcome, SharedBridge, SharedStorageBridge,
    SqliteWidgetHost, UnavailableBridge, WidgetDiagnostics, WidgetHost,
};
pub use clock::{Clock, SystemClock};
pub use config::StorageConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{EntryValidationError, TextEntry, TextEntryList};
pub use model::snapshot::{
    decode_entries, decode_snapshot, encode_snapshot, SnapshotError, DEFAULT_SHARED_NAMESPACE,
    SAVED_TEXTS_KEY,
};
pub use repo::kv_repo::{KeyValueStore, SqliteKeyValueStore, StoreError, StoreResult};
pub use repo::widget_repo::WidgetId;
pub use screen::app_screen::{AppScreen, ClearPrompt, Notice, ScreenError, ScreenUpdate};
pub use service::text_store::{TextStore, TextStoreError};
pub use widget::provider::{RenderedWidget, WidgetProvider};
pub use widget::renderer::{
    render_entries, render_snapshot, EmptyReason, RefreshPolicy, WidgetRenderer, WidgetTimeline,
    WidgetView,
};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
