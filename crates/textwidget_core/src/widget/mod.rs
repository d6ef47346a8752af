//! Widget-side rendering of the shared snapshot.
//!
//! # Responsibility
//! - Project the shared `savedTexts` blob into what a home-screen widget
//!   draws.
//! - Answer OS lifecycle callbacks (enable/disable/update/refresh).
//!
//! # Invariants
//! - Rendering never fails and never writes the snapshot.
//! - At most three entries are shown; the rest collapse into one overflow
//!   line.

pub mod provider;
pub mod renderer;
