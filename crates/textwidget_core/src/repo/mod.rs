//! Repository layer for key/value areas and widget host bookkeeping.
//!
//! # Invariants
//! - Repositories only operate on migrated connections.
//! - SQL never leaks past this module.

pub mod kv_repo;
pub mod widget_repo;
