//! Text Store: the app-owned ordered list of saved snippets.
//!
//! # Responsibility
//! - Append/clear the in-memory list and persist every mutation to the
//!   app-private key/value area.
//! - Load the last persisted list, degrading to empty when it cannot be read
//!   or is not JSON, and repairing a list that breaks entry invariants.
//!
//! # Invariants
//! - Blank input (after trim) never mutates the list.
//! - Loading never drops a readable entry with non-blank text.
//! - A mutation is committed in memory only after the primary write succeeds.
//! - The store never publishes to shared storage; callers do that.

use crate::clock::{Clock, SystemClock};
use crate::model::entry::{EntryValidationError, TextEntry, TextEntryList};
use crate::model::snapshot::{
    decode_entries, decode_snapshot, encode_snapshot, SnapshotError, SAVED_TEXTS_KEY,
};
use crate::repo::kv_repo::{KeyValueStore, StoreError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Text Store mutation error.
#[derive(Debug)]
pub enum TextStoreError {
    /// Primary storage write failed.
    Write(StoreError),
    Encode(SnapshotError),
    Entry(EntryValidationError),
}

impl Display for TextStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write(err) => write!(f, "primary storage write failed: {err}"),
            Self::Encode(err) => write!(f, "{err}"),
            Self::Entry(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TextStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Write(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Entry(err) => Some(err),
        }
    }
}

impl From<StoreError> for TextStoreError {
    fn from(value: StoreError) -> Self {
        Self::Write(value)
    }
}

impl From<SnapshotError> for TextStoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Encode(value)
    }
}

impl From<EntryValidationError> for TextStoreError {
    fn from(value: EntryValidationError) -> Self {
        Self::Entry(value)
    }
}

/// App-owned saved-text list backed by a primary key/value area.
pub struct TextStore<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    entries: TextEntryList,
}

impl<S: KeyValueStore> TextStore<S> {
    /// Opens the store on the wall clock and loads the persisted list.
    pub fn open(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TextStore<S, C> {
    /// Opens the store with a caller-provided clock and loads the list.
    pub fn with_clock(store: S, clock: C) -> Self {
        let mut text_store = Self {
            store,
            clock,
            entries: TextEntryList::new(),
        };
        text_store.load();
        text_store
    }

    /// Current in-memory list.
    pub fn entries(&self) -> &TextEntryList {
        &self.entries
    }

    /// Reloads the last persisted list.
    ///
    /// Missing, unreadable or non-JSON data yields an empty list; the failure
    /// is logged, never returned. A list that parses but carries duplicate or
    /// empty ids gets fresh ids, and blank entries are dropped. The stored
    /// value itself is only rewritten by the next mutation.
    pub fn load(&mut self) -> TextEntryList {
        self.entries = match self.store.get(SAVED_TEXTS_KEY) {
            Ok(Some(raw)) => match decode_snapshot(&raw) {
                Ok(list) => list,
                Err(SnapshotError::Invalid(reason)) => self.repair(&raw, &reason),
                Err(err) => {
                    warn!(
                        "event=text_load module=store status=degraded error_code=parse_failed raw_len={} error={err}",
                        raw.len()
                    );
                    TextEntryList::new()
                }
            },
            Ok(None) => TextEntryList::new(),
            Err(err) => {
                warn!(
                    "event=text_load module=store status=degraded error_code=read_failed error={err}"
                );
                TextEntryList::new()
            }
        };
        info!(
            "event=text_load module=store status=ok namespace={} count={}",
            self.store.namespace(),
            self.entries.len()
        );
        self.entries.clone()
    }

    /// Appends one snippet and persists the new list.
    ///
    /// Blank input returns the unchanged list without touching storage.
    /// The stored text is the input as typed, not trimmed.
    ///
    /// # Errors
    /// - `Write` when primary storage rejects the new snapshot; the in-memory
    ///   list is left unchanged.
    pub fn append(&mut self, text: &str) -> Result<TextEntryList, TextStoreError> {
        if text.trim().is_empty() {
            return Ok(self.entries.clone());
        }

        let entry = TextEntry::new(self.next_id(), text)?;
        let mut next = self.entries.clone();
        next.push(entry)?;
        self.persist(&next)?;
        self.entries = next;

        info!(
            "event=text_append module=store status=ok count={} text_len={}",
            self.entries.len(),
            text.chars().count()
        );
        Ok(self.entries.clone())
    }

    /// Replaces the list with an empty one and persists it.
    pub fn clear(&mut self) -> Result<TextEntryList, TextStoreError> {
        let next = TextEntryList::new();
        self.persist(&next)?;
        let removed = self.entries.len();
        self.entries = next;

        info!("event=text_clear module=store status=ok removed={removed}");
        Ok(self.entries.clone())
    }

    fn persist(&self, list: &TextEntryList) -> Result<(), TextStoreError> {
        let raw = encode_snapshot(list)?;
        self.store.set(SAVED_TEXTS_KEY, &raw).map_err(|err| {
            warn!(
                "event=text_persist module=store status=error error_code=write_failed count={} error={err}",
                list.len()
            );
            TextStoreError::from(err)
        })
    }

    fn next_id(&self) -> String {
        fresh_id(self.clock.now_millis(), self.entries.iter().map(|entry| entry.id.as_str()))
    }

    fn repair(&self, raw: &str, reason: &EntryValidationError) -> TextEntryList {
        let entries = match decode_entries(raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=text_load module=store status=degraded error_code=parse_failed raw_len={} error={err}",
                    raw.len()
                );
                return TextEntryList::new();
            }
        };

        let now = self.clock.now_millis();
        let mut taken: HashSet<String> = entries.iter().map(|entry| entry.id.clone()).collect();
        let mut list = TextEntryList::new();
        let mut dropped = 0usize;
        let mut reassigned = 0usize;
        for mut entry in entries {
            if entry.text.trim().is_empty() {
                dropped += 1;
                continue;
            }
            if entry.id.trim().is_empty() || list.contains_id(&entry.id) {
                let id = fresh_id(now, taken.iter().map(String::as_str));
                taken.insert(id.clone());
                entry.id = id;
                reassigned += 1;
            }
            if let Err(err) = list.push(entry) {
                warn!("event=text_load module=store status=degraded error_code=repair_skipped error={err}");
                dropped += 1;
            }
        }

        warn!(
            "event=text_load module=store status=repaired reason={reason} kept={} reassigned={reassigned} dropped={dropped}",
            list.len()
        );
        list
    }
}

/// Timestamp id, bumped past the newest numeric id and any collision.
fn fresh_id<'a>(now: i64, existing: impl Iterator<Item = &'a str> + Clone) -> String {
    let newest = existing
        .clone()
        .filter_map(|id| id.parse::<i64>().ok())
        .max();
    let mut candidate = match newest {
        Some(newest) if newest >= now => newest.saturating_add(1),
        _ => now,
    };
    loop {
        let id = candidate.to_string();
        if !existing.clone().any(|taken| taken == id) {
            return id;
        }
        candidate = candidate.saturating_add(1);
    }
}
