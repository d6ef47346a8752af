//! Widget process entry points.
//!
//! Mirrors the OS callbacks a widget receives: first instance enabled, last
//! instance disabled, periodic update, and explicit refresh requests queued
//! by the app's bridge.

use crate::clock::{Clock, SystemClock};
use crate::repo::kv_repo::{SqliteKeyValueStore, StoreResult};
use crate::repo::widget_repo::{SqliteWidgetRepository, WidgetId};
use crate::widget::renderer::{RefreshPolicy, WidgetRenderer, WidgetTimeline};
use log::info;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// One widget instance's redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWidget {
    pub widget_id: WidgetId,
    pub timeline: WidgetTimeline,
}

/// Widget-side view of the shared database.
pub struct WidgetProvider<'conn, C: Clock = SystemClock> {
    renderer: WidgetRenderer<SqliteKeyValueStore<'conn>>,
    widgets: SqliteWidgetRepository<'conn>,
    clock: C,
}

impl<'conn> WidgetProvider<'conn> {
    pub fn try_new(
        conn: &'conn Connection,
        namespace: &str,
        line_width: usize,
    ) -> StoreResult<Self> {
        Self::with_clock(conn, namespace, line_width, SystemClock)
    }
}

impl<'conn, C: Clock> WidgetProvider<'conn, C> {
    pub fn with_clock(
        conn: &'conn Connection,
        namespace: &str,
        line_width: usize,
        clock: C,
    ) -> StoreResult<Self> {
        let shared = SqliteKeyValueStore::try_new(conn, namespace)?;
        Ok(Self {
            renderer: WidgetRenderer::new(shared, line_width),
            widgets: SqliteWidgetRepository::new(conn, namespace),
            clock,
        })
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.renderer = self.renderer.with_policy(policy);
        self
    }

    /// Registers an installed instance so publishes can target it.
    pub fn on_enabled(&self, widget_id: WidgetId) -> StoreResult<()> {
        self.widgets.attach(widget_id)?;
        info!("event=widget_enabled module=widget status=ok widget_id={widget_id}");
        Ok(())
    }

    /// Forgets a removed instance.
    pub fn on_disabled(&self, widget_id: WidgetId) -> StoreResult<bool> {
        let removed = self.widgets.detach(widget_id)?;
        info!("event=widget_disabled module=widget status=ok widget_id={widget_id} removed={removed}");
        Ok(removed)
    }

    /// Renders the current snapshot once per requested instance.
    pub fn on_update(&self, widget_ids: &[WidgetId]) -> Vec<RenderedWidget> {
        let timeline = self.renderer.timeline(self.clock.now_millis());
        widget_ids
            .iter()
            .map(|widget_id| RenderedWidget {
                widget_id: *widget_id,
                timeline: timeline.clone(),
            })
            .collect()
    }

    /// Drains queued refresh requests and redraws the still-attached
    /// instances they name, each once.
    pub fn poll_refresh(&self) -> StoreResult<Vec<RenderedWidget>> {
        let requests = self.widgets.drain_refresh()?;
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let attached: BTreeSet<WidgetId> = self.widgets.widget_ids()?.into_iter().collect();
        let targets: Vec<WidgetId> = requests
            .iter()
            .flat_map(|request| request.widget_ids.iter().copied())
            .filter(|widget_id| attached.contains(widget_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        info!(
            "event=widget_refresh module=widget status=ok requests={} widgets={}",
            requests.len(),
            targets.len()
        );
        Ok(self.on_update(&targets))
    }

    /// Renders without an instance context (preview/smoke use).
    pub fn snapshot(&self) -> WidgetTimeline {
        self.renderer.timeline(self.clock.now_millis())
    }
}
