//! Text entry and ordered entry list.
//!
//! # Invariants
//! - `id` is non-empty and unique within a `TextEntryList`.
//! - `text` is non-empty after trimming.
//! - Entries are immutable once created; lists only grow by append or are
//!   replaced wholesale by clear.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One saved snippet.
///
/// Field names are part of the shared `savedTexts` wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    /// Creation timestamp in epoch milliseconds, as a decimal string.
    pub id: String,
    /// User input exactly as submitted.
    pub text: String,
}

impl TextEntry {
    /// Creates an entry after checking id/text invariants.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, EntryValidationError> {
        let entry = Self {
            id: id.into(),
            text: text.into(),
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Checks single-entry invariants.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.id.trim().is_empty() {
            return Err(EntryValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(EntryValidationError::BlankText {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Entry/list invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyId,
    BlankText { id: String },
    DuplicateId(String),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "entry id must not be empty"),
            Self::BlankText { id } => write!(f, "entry `{id}` has blank text"),
            Self::DuplicateId(id) => write!(f, "entry id `{id}` appears more than once"),
        }
    }
}

impl Error for EntryValidationError {}

/// Ordered list of saved snippets.
///
/// Deserialization runs the same invariant checks as [`TextEntryList::push`],
/// so a decoded list is always valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TextEntry>", into = "Vec<TextEntry>")]
pub struct TextEntryList {
    entries: Vec<TextEntry>,
}

impl TextEntryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[TextEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextEntry> {
        self.entries.iter()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Appends one entry at the end of the list.
    ///
    /// # Errors
    /// - Entry-level invariant failures.
    /// - `DuplicateId` when the id is already present.
    pub fn push(&mut self, entry: TextEntry) -> Result<(), EntryValidationError> {
        entry.validate()?;
        if self.contains_id(&entry.id) {
            return Err(EntryValidationError::DuplicateId(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }
}

impl TryFrom<Vec<TextEntry>> for TextEntryList {
    type Error = EntryValidationError;

    fn try_from(entries: Vec<TextEntry>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.id.as_str()) {
                return Err(EntryValidationError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }
}

impl From<TextEntryList> for Vec<TextEntry> {
    fn from(value: TextEntryList) -> Self {
        value.entries
    }
}

impl<'a> IntoIterator for &'a TextEntryList {
    type Item = &'a TextEntry;
    type IntoIter = std::slice::Iter<'a, TextEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
