//! Line/column addressed text buffers with self-anchoring cursors.
//!
//! [`Buffer`] is the contract an editing widget programs against;
//! [`RopeBuffer`] is the rope-backed implementation. [`Cursor`] and [`Region`]
//! register with a buffer to stay attached to the text as it changes.

mod buffer;
mod cursor;
mod delimiter;
mod rope;

pub use buffer::{Buffer, BufferError, BufferId, Position, Result};
pub use cursor::{Anchor, Cursor, Region};
pub use delimiter::{LineDelimiter, clamp, detect_line_delim};
pub use rope::RopeBuffer;
