// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::BufferError)
    clippy::module_name_repetitions
)]

//! # Ropeline
//!
//! A line/column addressed text buffer for interactive editing.
//!
//! Ropeline stores large mutable text in a rope and exposes:
//! - Insert, remove, slice, and count by (line, column) in code points
//! - Byte position conversion in both directions
//! - Lazy forward and backward iteration over code points
//! - Cursors that stay anchored to the text as it is edited
//! - Cursor motion: by character, by line, and by word boundary
//!
//! ## Modules
//!
//! - [`editor`]: The buffer contract, the rope implementation, cursors
//! - [`config`]: Buffer defaults loaded from rc files
//! - [`perf`]: Opt-in timing of edit operations

pub mod config;
pub mod editor;
pub mod perf;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{
        Buffer, BufferError, Cursor, LineDelimiter, Position, Region, RopeBuffer,
    };
}
