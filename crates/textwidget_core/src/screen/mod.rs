//! App Screen orchestration.
//!
//! # Responsibility
//! - Turn user intents (add, clear-all with confirmation, re-publish,
//!   diagnostics) into Text Store and Shared Bridge calls.
//! - Expose what the view shows: input, list, pending prompt, notice.
//!
//! # Invariants
//! - Every successful mutation is followed by exactly one publish.
//! - Bridge failures never undo a primary write.

pub mod app_screen;
