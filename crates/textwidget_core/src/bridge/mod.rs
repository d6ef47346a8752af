//! Shared Bridge: app-to-widget publish path.
//!
//! # Responsibility
//! - Copy the app's snapshot into the widget-visible shared area.
//! - Ask installed widgets to redraw after a successful write.
//! - Answer read-only diagnostic queries.
//!
//! # Invariants
//! - The bridge never touches the app-private store; a failed publish
//!   never rolls back the primary write.
//! - Publish is best-effort and never retried.
//! - `inspect` does not alter stored state.

use crate::model::entry::TextEntryList;
use crate::model::snapshot::SnapshotError;
use crate::repo::kv_repo::StoreError;
use crate::repo::widget_repo::WidgetId;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod shared_storage;
mod widget_host;

pub use shared_storage::{summarize_snapshot, SharedStorageBridge, UnavailableBridge};
pub use widget_host::{SqliteWidgetHost, WidgetHost};

/// User-facing message for [`BridgeError::PlatformUnavailable`].
pub const PLATFORM_UNAVAILABLE_MESSAGE: &str = "Widget no disponible en esta plataforma";

/// Shared Bridge failures.
#[derive(Debug)]
pub enum BridgeError {
    /// No shared area or widget support on this platform/build.
    PlatformUnavailable,
    /// Shared area write failed.
    WriteFailure(StoreError),
    /// Shared area read failed during diagnostics.
    ReadFailure(StoreError),
    /// Widget host bookkeeping failed.
    HostFailure(StoreError),
    Encode(SnapshotError),
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlatformUnavailable => write!(f, "{PLATFORM_UNAVAILABLE_MESSAGE}"),
            Self::WriteFailure(err) => write!(f, "shared storage write failed: {err}"),
            Self::ReadFailure(err) => write!(f, "shared storage read failed: {err}"),
            Self::HostFailure(err) => write!(f, "widget host failed: {err}"),
            Self::Encode(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PlatformUnavailable => None,
            Self::WriteFailure(err) | Self::ReadFailure(err) | Self::HostFailure(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Outcome of the refresh request sent after a shared write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A redraw was requested for these instances.
    Requested(Vec<WidgetId>),
    /// No widget is installed; nothing to redraw.
    NoWidgets,
    /// The write landed but the redraw request did not.
    Failed(String),
}

/// Result of a successful shared write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub entry_count: usize,
    pub refresh: RefreshOutcome,
}

/// Read-only view of what the widget side currently sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDiagnostics {
    /// Installed widget ids joined as `"1, 2"`.
    pub widget_ids: String,
    pub widget_count: u32,
    /// Raw shared payload, `"[]"` when absent.
    pub saved_texts_raw: String,
    /// Entries decoded from the raw payload, 0 when it does not decode.
    pub entry_count: usize,
    /// Human-readable summary of the payload.
    pub parsed_texts: String,
    /// Informational local `HH:MM:SS` of the next scheduled refresh.
    pub next_update_time: String,
}

/// Narrow capability the App Screen depends on.
pub trait SharedBridge {
    /// Writes `list` to the shared area and requests a widget redraw.
    fn publish(&self, list: &TextEntryList) -> Result<PublishReport, BridgeError>;
    /// Reports shared-area and widget state without mutating it.
    fn inspect(&self) -> Result<WidgetDiagnostics, BridgeError>;
}

impl<B: SharedBridge + ?Sized> SharedBridge for Box<B> {
    fn publish(&self, list: &TextEntryList) -> Result<PublishReport, BridgeError> {
        (**self).publish(list)
    }

    fn inspect(&self) -> Result<WidgetDiagnostics, BridgeError> {
        (**self).inspect()
    }
}
