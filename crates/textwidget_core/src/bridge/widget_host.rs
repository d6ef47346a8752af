//! Widget host seam: which widgets are installed and how to poke them.

use crate::clock::{Clock, SystemClock};
use crate::repo::kv_repo::StoreResult;
use crate::repo::widget_repo::{join_widget_ids, SqliteWidgetRepository, WidgetId};
use log::info;
use rusqlite::Connection;

/// OS widget manager as seen from the app process.
pub trait WidgetHost {
    /// Installed widget instance ids.
    fn widget_ids(&self) -> StoreResult<Vec<WidgetId>>;
    /// Requests an immediate redraw; the OS may coalesce or delay it.
    fn request_refresh(&self, widget_ids: &[WidgetId]) -> StoreResult<()>;
}

/// Widget host backed by the shared database.
///
/// Widget processes attach/detach themselves and drain refresh requests
/// through [`crate::widget::provider::WidgetProvider`].
pub struct SqliteWidgetHost<'conn, C: Clock = SystemClock> {
    widgets: SqliteWidgetRepository<'conn>,
    clock: C,
}

impl<'conn> SqliteWidgetHost<'conn> {
    pub fn new(conn: &'conn Connection, namespace: impl Into<String>) -> Self {
        Self::with_clock(conn, namespace, SystemClock)
    }
}

impl<'conn, C: Clock> SqliteWidgetHost<'conn, C> {
    pub fn with_clock(conn: &'conn Connection, namespace: impl Into<String>, clock: C) -> Self {
        Self {
            widgets: SqliteWidgetRepository::new(conn, namespace),
            clock,
        }
    }
}

impl<C: Clock> WidgetHost for SqliteWidgetHost<'_, C> {
    fn widget_ids(&self) -> StoreResult<Vec<WidgetId>> {
        self.widgets.widget_ids()
    }

    fn request_refresh(&self, widget_ids: &[WidgetId]) -> StoreResult<()> {
        let request_id = self
            .widgets
            .enqueue_refresh(widget_ids, self.clock.now_millis())?;
        info!(
            "event=widget_refresh_request module=bridge status=ok request_id={request_id} widget_ids=[{}]",
            join_widget_ids(widget_ids)
        );
        Ok(())
    }
}
