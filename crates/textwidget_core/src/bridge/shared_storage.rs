//! Bridge implementations.

use super::{BridgeError, PublishReport, RefreshOutcome, SharedBridge, WidgetDiagnostics};
use crate::bridge::widget_host::WidgetHost;
use crate::clock::{Clock, SystemClock};
use crate::model::entry::TextEntryList;
use crate::model::snapshot::{decode_snapshot, encode_snapshot, SAVED_TEXTS_KEY};
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::widget_repo::join_widget_ids;
use crate::widget::renderer::{RefreshPolicy, MAX_VISIBLE_ENTRIES};
use chrono::{DateTime, Local, Utc};
use log::{info, warn};

const EMPTY_SNAPSHOT: &str = "[]";

/// Bridge writing to a shared key/value area and signalling a widget host.
pub struct SharedStorageBridge<S: KeyValueStore, H: WidgetHost, C: Clock = SystemClock> {
    shared: S,
    host: H,
    clock: C,
    policy: RefreshPolicy,
}

impl<S: KeyValueStore, H: WidgetHost> SharedStorageBridge<S, H> {
    pub fn new(shared: S, host: H) -> Self {
        Self::with_clock(shared, host, SystemClock)
    }
}

impl<S: KeyValueStore, H: WidgetHost, C: Clock> SharedStorageBridge<S, H, C> {
    pub fn with_clock(shared: S, host: H, clock: C) -> Self {
        Self {
            shared,
            host,
            clock,
            policy: RefreshPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn signal_refresh(&self) -> RefreshOutcome {
        let widget_ids = match self.host.widget_ids() {
            Ok(ids) => ids,
            Err(err) => {
                warn!(
                    "event=widget_publish module=bridge status=degraded error_code=host_query_failed error={err}"
                );
                return RefreshOutcome::Failed(err.to_string());
            }
        };
        if widget_ids.is_empty() {
            info!("event=widget_publish module=bridge status=ok refresh=skipped reason=no_widgets");
            return RefreshOutcome::NoWidgets;
        }
        match self.host.request_refresh(&widget_ids) {
            Ok(()) => RefreshOutcome::Requested(widget_ids),
            Err(err) => {
                warn!(
                    "event=widget_publish module=bridge status=degraded error_code=refresh_failed error={err}"
                );
                RefreshOutcome::Failed(err.to_string())
            }
        }
    }
}

impl<S: KeyValueStore, H: WidgetHost, C: Clock> SharedBridge for SharedStorageBridge<S, H, C> {
    fn publish(&self, list: &TextEntryList) -> Result<PublishReport, BridgeError> {
        let raw = encode_snapshot(list).map_err(BridgeError::Encode)?;
        self.shared.set(SAVED_TEXTS_KEY, &raw).map_err(|err| {
            warn!(
                "event=widget_publish module=bridge status=error error_code=write_failed namespace={} error={err}",
                self.shared.namespace()
            );
            BridgeError::WriteFailure(err)
        })?;
        info!(
            "event=widget_publish module=bridge status=ok namespace={} count={}",
            self.shared.namespace(),
            list.len()
        );

        Ok(PublishReport {
            entry_count: list.len(),
            refresh: self.signal_refresh(),
        })
    }

    fn inspect(&self) -> Result<WidgetDiagnostics, BridgeError> {
        let widget_ids = self.host.widget_ids().map_err(BridgeError::HostFailure)?;
        let saved_texts_raw = self
            .shared
            .get(SAVED_TEXTS_KEY)
            .map_err(BridgeError::ReadFailure)?
            .unwrap_or_else(|| EMPTY_SNAPSHOT.to_string());
        let entry_count = decode_snapshot(&saved_texts_raw).map_or(0, |list| list.len());
        let next_update_ms = self.policy.next_refresh_at_ms(self.clock.now_millis());

        Ok(WidgetDiagnostics {
            widget_ids: join_widget_ids(&widget_ids),
            widget_count: u32::try_from(widget_ids.len()).unwrap_or(u32::MAX),
            parsed_texts: summarize_snapshot(&saved_texts_raw),
            saved_texts_raw,
            entry_count,
            next_update_time: format_local_clock(next_update_ms),
        })
    }
}

/// Bridge for platforms without a shared area or widget support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBridge;

impl SharedBridge for UnavailableBridge {
    fn publish(&self, _list: &TextEntryList) -> Result<PublishReport, BridgeError> {
        Err(BridgeError::PlatformUnavailable)
    }

    fn inspect(&self) -> Result<WidgetDiagnostics, BridgeError> {
        Err(BridgeError::PlatformUnavailable)
    }
}

/// Human-readable payload summary: total plus the texts a widget would show.
pub fn summarize_snapshot(raw: &str) -> String {
    match decode_snapshot(raw) {
        Ok(list) => {
            let samples = list
                .iter()
                .take(MAX_VISIBLE_ENTRIES)
                .map(|entry| entry.text.as_str())
                .collect::<Vec<_>>();
            format!("Total: {}, Ejemplos: {}", list.len(), samples.join(", "))
        }
        Err(err) => format!("Error al analizar JSON: {err}"),
    }
}

fn format_local_clock(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|instant| instant.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_local_clock, summarize_snapshot};

    #[test]
    fn summary_lists_at_most_three_samples() {
        let raw = r#"[{"id":"1","text":"a"},{"id":"2","text":"b"},{"id":"3","text":"c"},{"id":"4","text":"d"}]"#;
        assert_eq!(summarize_snapshot(raw), "Total: 4, Ejemplos: a, b, c");
    }

    #[test]
    fn summary_reports_parse_errors() {
        assert!(summarize_snapshot("nope").starts_with("Error al analizar JSON:"));
    }

    #[test]
    fn local_clock_has_time_of_day_shape() {
        let formatted = format_local_clock(1_700_000_000_000);
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
    }
}
