//! Saved-text domain model and the shared JSON contract.
//!
//! # Responsibility
//! - Define the entry/list shapes owned by the app process.
//! - Define the exact wire shape both the app and the widgets agree on.
//!
//! # Invariants
//! - Entry ids are unique within one list.
//! - List order is insertion order and display order.

pub mod entry;
pub mod snapshot;
