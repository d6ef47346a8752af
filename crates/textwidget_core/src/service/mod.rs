//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate key/value persistence into the saved-text use cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod text_store;
