//! Flutter-facing FFI surface for the saved-texts widget core.

pub mod api;
