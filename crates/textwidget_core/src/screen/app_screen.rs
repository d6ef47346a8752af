//! Screen state machine driving the Text Store and Shared Bridge.

use crate::bridge::{
    BridgeError, PublishReport, RefreshOutcome, SharedBridge, WidgetDiagnostics,
    PLATFORM_UNAVAILABLE_MESSAGE,
};
use crate::clock::{Clock, SystemClock};
use crate::model::entry::TextEntryList;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::text_store::{TextStore, TextStoreError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CLEAR_PROMPT_TITLE: &str = "Confirmar";
pub const CLEAR_PROMPT_MESSAGE: &str = "¿Estás seguro de que deseas borrar todos los textos?";
pub const CLEAR_PROMPT_CONFIRM: &str = "Borrar Todo";
pub const CLEAR_PROMPT_CANCEL: &str = "Cancelar";

/// Confirmation dialog content for clear-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearPrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
}

impl Default for ClearPrompt {
    fn default() -> Self {
        Self {
            title: CLEAR_PROMPT_TITLE,
            message: CLEAR_PROMPT_MESSAGE,
            confirm_label: CLEAR_PROMPT_CONFIRM,
            cancel_label: CLEAR_PROMPT_CANCEL,
        }
    }
}

/// Non-blocking message for the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

/// Screen-level errors.
#[derive(Debug)]
pub enum ScreenError {
    Store(TextStoreError),
    /// `confirm_clear` without a preceding `request_clear`.
    ClearNotRequested,
}

impl Display for ScreenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::ClearNotRequested => write!(f, "clear-all was not requested"),
        }
    }
}

impl Error for ScreenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::ClearNotRequested => None,
        }
    }
}

impl From<TextStoreError> for ScreenError {
    fn from(value: TextStoreError) -> Self {
        Self::Store(value)
    }
}

/// List after an intent plus the publish result, if one happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenUpdate {
    pub entries: TextEntryList,
    pub published: Option<PublishReport>,
}

/// The saved-texts screen.
pub struct AppScreen<S: KeyValueStore, B: SharedBridge, C: Clock = SystemClock> {
    store: TextStore<S, C>,
    bridge: B,
    input: String,
    pending_clear: bool,
    notice: Option<Notice>,
}

impl<S: KeyValueStore, B: SharedBridge> AppScreen<S, B> {
    /// Mounts the screen: loads the persisted list on the wall clock.
    pub fn open(store: S, bridge: B) -> Self {
        Self::with_text_store(TextStore::open(store), bridge)
    }
}

impl<S: KeyValueStore, B: SharedBridge, C: Clock> AppScreen<S, B, C> {
    pub fn with_text_store(store: TextStore<S, C>, bridge: B) -> Self {
        Self {
            store,
            bridge,
            input: String::new(),
            pending_clear: false,
            notice: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn entries(&self) -> &TextEntryList {
        self.store.entries()
    }

    pub fn is_clear_pending(&self) -> bool {
        self.pending_clear
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Saves the current input as a new entry and publishes.
    ///
    /// Blank input does nothing. On success the input is cleared; on a
    /// primary write failure the input is kept and a warning is shown.
    pub fn submit(&mut self) -> Result<ScreenUpdate, ScreenError> {
        if self.input.trim().is_empty() {
            return Ok(self.unchanged());
        }

        let entries = match self.store.append(&self.input) {
            Ok(entries) => entries,
            Err(err) => {
                self.notice = Some(Notice::Warning(err.to_string()));
                return Err(err.into());
            }
        };
        self.input.clear();
        let published = self.publish_after_mutation();
        Ok(ScreenUpdate { entries, published })
    }

    /// Opens the clear-all confirmation.
    pub fn request_clear(&mut self) -> ClearPrompt {
        self.pending_clear = true;
        ClearPrompt::default()
    }

    pub fn cancel_clear(&mut self) {
        self.pending_clear = false;
    }

    /// Clears every entry after confirmation and publishes the empty list.
    pub fn confirm_clear(&mut self) -> Result<ScreenUpdate, ScreenError> {
        if !self.pending_clear {
            return Err(ScreenError::ClearNotRequested);
        }
        self.pending_clear = false;

        let entries = match self.store.clear() {
            Ok(entries) => entries,
            Err(err) => {
                self.notice = Some(Notice::Warning(err.to_string()));
                return Err(err.into());
            }
        };
        let published = self.publish_after_mutation();
        Ok(ScreenUpdate { entries, published })
    }

    /// Manual "force refresh": publishes the current list again.
    pub fn republish(&mut self) -> Option<PublishReport> {
        match self.bridge.publish(self.store.entries()) {
            Ok(report) => {
                self.notice_refresh_failure(&report);
                Some(report)
            }
            Err(err) => {
                self.notice = Some(notice_for(&err));
                None
            }
        }
    }

    /// Manual widget diagnostics query.
    pub fn diagnostics(&mut self) -> Option<WidgetDiagnostics> {
        match self.bridge.inspect() {
            Ok(diagnostics) => Some(diagnostics),
            Err(err) => {
                self.notice = Some(notice_for(&err));
                None
            }
        }
    }

    fn unchanged(&self) -> ScreenUpdate {
        ScreenUpdate {
            entries: self.store.entries().clone(),
            published: None,
        }
    }

    /// Publish following a mutation. A missing platform bridge stays silent
    /// here; the user only hears about it on explicit intents.
    fn publish_after_mutation(&mut self) -> Option<PublishReport> {
        match self.bridge.publish(self.store.entries()) {
            Ok(report) => {
                self.notice_refresh_failure(&report);
                Some(report)
            }
            Err(BridgeError::PlatformUnavailable) => {
                debug!("event=screen_publish module=screen status=skipped reason=platform_unavailable");
                None
            }
            Err(err) => {
                warn!("event=screen_publish module=screen status=error error={err}");
                self.notice = Some(Notice::Warning(err.to_string()));
                None
            }
        }
    }

    fn notice_refresh_failure(&mut self, report: &PublishReport) {
        if let RefreshOutcome::Failed(message) = &report.refresh {
            self.notice = Some(Notice::Warning(format!(
                "widget refresh request failed: {message}"
            )));
        }
    }
}

fn notice_for(err: &BridgeError) -> Notice {
    match err {
        BridgeError::PlatformUnavailable => Notice::Info(PLATFORM_UNAVAILABLE_MESSAGE.to_string()),
        other => Notice::Warning(other.to_string()),
    }
}
