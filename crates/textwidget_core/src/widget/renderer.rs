//! Pure widget projection and refresh timeline.

use crate::model::entry::TextEntryList;
use crate::model::snapshot::{decode_snapshot, SAVED_TEXTS_KEY};
use crate::repo::kv_repo::KeyValueStore;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Header drawn above the entry lines by widget shells.
pub const WIDGET_TITLE: &str = "Textos guardados:";
/// Placeholder for an absent or empty snapshot.
pub const EMPTY_PLACEHOLDER: &str = "No hay textos guardados";
/// Placeholder for a snapshot that cannot be decoded.
pub const ERROR_PLACEHOLDER: &str = "Error al cargar textos";
/// Maximum number of entry lines a widget shows.
pub const MAX_VISIBLE_ENTRIES: usize = 3;
/// Refresh period shared by every widget target.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

const ELLIPSIS: char = '…';

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Why a widget shows a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoEntries,
    LoadError,
}

/// What a widget draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetView {
    Empty {
        reason: EmptyReason,
    },
    Populated {
        /// One display line per shown entry, `1..=MAX_VISIBLE_ENTRIES`.
        entries: Vec<String>,
        /// Entries beyond the shown ones.
        overflow: usize,
    },
}

impl WidgetView {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn overflow_count(&self) -> usize {
        match self {
            Self::Empty { .. } => 0,
            Self::Populated { overflow, .. } => *overflow,
        }
    }

    /// Placeholder text for the Empty state.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Empty {
                reason: EmptyReason::NoEntries,
            } => Some(EMPTY_PLACEHOLDER),
            Self::Empty {
                reason: EmptyReason::LoadError,
            } => Some(ERROR_PLACEHOLDER),
            Self::Populated { .. } => None,
        }
    }

    /// Lines in draw order: entries then the overflow line, or the
    /// placeholder alone.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Empty { .. } => self
                .placeholder()
                .map(|text| vec![text.to_string()])
                .unwrap_or_default(),
            Self::Populated { entries, overflow } => {
                let mut lines = entries.clone();
                if *overflow > 0 {
                    lines.push(overflow_line(*overflow));
                }
                lines
            }
        }
    }

    /// Newline-joined body, the single-TextView rendering.
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }
}

/// Summary line for entries that do not fit.
pub fn overflow_line(hidden: usize) -> String {
    format!("+ {hidden} más...")
}

/// Reduces arbitrary text to one display line of at most `width` chars.
///
/// Uses the first non-blank line with whitespace runs collapsed; longer
/// lines end in `…`.
pub fn display_line(text: &str, width: usize) -> String {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    let collapsed = WHITESPACE_RE.replace_all(first, " ");
    let width = width.max(1);

    if collapsed.chars().count() <= width {
        return collapsed.into_owned();
    }
    let mut line: String = collapsed.chars().take(width - 1).collect();
    line.push(ELLIPSIS);
    line
}

/// Projects a list into a widget view.
pub fn render_entries(list: &TextEntryList, line_width: usize) -> WidgetView {
    if list.is_empty() {
        return WidgetView::Empty {
            reason: EmptyReason::NoEntries,
        };
    }
    WidgetView::Populated {
        entries: list
            .iter()
            .take(MAX_VISIBLE_ENTRIES)
            .map(|entry| display_line(&entry.text, line_width))
            .collect(),
        overflow: list.len().saturating_sub(MAX_VISIBLE_ENTRIES),
    }
}

/// Projects a raw shared payload into a widget view.
///
/// An absent payload is the same as `[]`; a payload that does not decode
/// yields the error placeholder.
pub fn render_snapshot(raw: Option<&str>, line_width: usize) -> WidgetView {
    let Some(raw) = raw else {
        return render_entries(&TextEntryList::new(), line_width);
    };
    match decode_snapshot(raw) {
        Ok(list) => render_entries(&list, line_width),
        Err(err) => {
            warn!(
                "event=widget_render module=widget status=degraded error_code=parse_failed raw_len={} error={err}",
                raw.len()
            );
            WidgetView::Empty {
                reason: EmptyReason::LoadError,
            }
        }
    }
}

/// Fixed-interval refresh schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl RefreshPolicy {
    pub fn next_refresh_at_ms(&self, now_ms: i64) -> i64 {
        let interval_ms = i64::try_from(self.interval.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_add(interval_ms)
    }
}

/// One rendered frame plus when the OS should ask again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetTimeline {
    pub view: WidgetView,
    pub rendered_at_ms: i64,
    pub next_refresh_at_ms: i64,
}

/// Reads the shared area and renders it.
pub struct WidgetRenderer<S: KeyValueStore> {
    shared: S,
    line_width: usize,
    policy: RefreshPolicy,
}

impl<S: KeyValueStore> WidgetRenderer<S> {
    pub fn new(shared: S, line_width: usize) -> Self {
        Self {
            shared,
            line_width,
            policy: RefreshPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Renders the current shared snapshot. Read failures render the error
    /// placeholder.
    pub fn render(&self) -> WidgetView {
        match self.shared.get(SAVED_TEXTS_KEY) {
            Ok(raw) => {
                let view = render_snapshot(raw.as_deref(), self.line_width);
                debug!(
                    "event=widget_render module=widget status=ok namespace={} lines={} overflow={}",
                    self.shared.namespace(),
                    view.lines().len(),
                    view.overflow_count()
                );
                view
            }
            Err(err) => {
                warn!(
                    "event=widget_render module=widget status=degraded error_code=read_failed error={err}"
                );
                WidgetView::Empty {
                    reason: EmptyReason::LoadError,
                }
            }
        }
    }

    pub fn timeline(&self, now_ms: i64) -> WidgetTimeline {
        WidgetTimeline {
            view: self.render(),
            rendered_at_ms: now_ms,
            next_refresh_at_ms: self.policy.next_refresh_at_ms(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{display_line, overflow_line, render_snapshot, EmptyReason, WidgetView};

    #[test]
    fn display_line_keeps_first_non_blank_line() {
        assert_eq!(display_line("\n  hola   mundo \nsegunda", 40), "hola mundo");
    }

    #[test]
    fn display_line_truncates_by_chars_with_ellipsis() {
        assert_eq!(display_line("ñandúes corriendo", 6), "ñandú…");
        assert_eq!(display_line("abc", 3), "abc");
    }

    #[test]
    fn overflow_line_uses_fixed_wording() {
        assert_eq!(overflow_line(1), "+ 1 más...");
    }

    #[test]
    fn absent_snapshot_is_empty_not_error() {
        assert_eq!(
            render_snapshot(None, 40),
            WidgetView::Empty {
                reason: EmptyReason::NoEntries
            }
        );
    }

    #[test]
    fn non_array_json_is_load_error() {
        let view = render_snapshot(Some(r#"{"id":"1","text":"a"}"#), 40);
        assert_eq!(view.to_text(), "Error al cargar textos");
    }
}
