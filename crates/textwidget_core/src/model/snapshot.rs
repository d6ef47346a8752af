//! Shared `savedTexts` snapshot codec.
//!
//! This is the only bit-exact contract between the app and the widgets:
//! a JSON array of `{"id": string, "text": string}` stored under
//! [`SAVED_TEXTS_KEY`]. Unknown object fields are ignored on decode; encode
//! emits exactly `id` and `text`.

use crate::model::entry::{EntryValidationError, TextEntry, TextEntryList};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key under which both primary and shared storage keep the snapshot.
pub const SAVED_TEXTS_KEY: &str = "savedTexts";

/// Default shared storage namespace (app-group / shared-preferences name).
pub const DEFAULT_SHARED_NAMESPACE: &str = "com.ggg02.resetnativelocale.shared";

/// Snapshot decode/encode failures.
#[derive(Debug)]
pub enum SnapshotError {
    /// Payload is not a JSON array of `{id, text}` objects.
    Malformed(serde_json::Error),
    /// Payload parsed but violates list invariants.
    Invalid(EntryValidationError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed snapshot json: {err}"),
            Self::Invalid(err) => write!(f, "invalid snapshot: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

impl From<EntryValidationError> for SnapshotError {
    fn from(value: EntryValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Serializes a list into the shared wire shape.
pub fn encode_snapshot(list: &TextEntryList) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(list.as_slice())?)
}

/// Parses a shared wire payload into a validated list.
pub fn decode_snapshot(raw: &str) -> Result<TextEntryList, SnapshotError> {
    Ok(TextEntryList::try_from(decode_entries(raw)?)?)
}

/// Parses the wire shape without checking list invariants.
///
/// Used by recovery paths that repair duplicate ids or blank texts instead
/// of discarding the whole payload.
pub fn decode_entries(raw: &str) -> Result<Vec<TextEntry>, SnapshotError> {
    Ok(serde_json::from_str(raw)?)
}
