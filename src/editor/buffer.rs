use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use super::cursor::Cursor;
use super::delimiter::LineDelimiter;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a buffer, used by cursors instead of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

impl BufferId {
    /// Allocate a fresh identity. Never returns the same id twice in a process.
    pub fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A zero-based (line, column) position. Columns count code points.
///
/// Ordering is buffer order: by line, then by column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Errors produced by buffer and cursor operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("line {line} is out of range (buffer has {lines} lines)")]
    LineOutOfRange { line: usize, lines: usize },
    #[error("cursor belongs to buffer {cursor:?}, not {buffer:?}")]
    ForeignCursor { cursor: BufferId, buffer: BufferId },
}

pub type Result<T, E = BufferError> = std::result::Result<T, E>;

/// A text store addressed by line and column.
///
/// All lines and columns start at zero. Columns are counted in code points,
/// byte positions in bytes. `slice` and `count` take inclusive ranges; `remove`
/// stops before its end position. A column may be one past the last code point of
/// a line, which addresses the delimiter (or the end of the buffer on the last
/// line).
///
/// Operations taking a line fail with [`BufferError::LineOutOfRange`] when the
/// line does not exist. Columns past the end of a line are clamped, never an
/// error. Use [`Buffer::clamp_line_col`] to sanitize untrusted positions.
pub trait Buffer {
    /// Identity used to match cursors to their buffer.
    fn id(&self) -> BufferId;

    /// Content of `line`, with its delimiter when `delim` is true and one is
    /// present. The flag reports whether a delimiter follows the line, which is
    /// false only for the last line.
    fn line(&self, line: usize, delim: bool) -> Result<(String, bool)>;

    /// Text from the start position through the end position, inclusive.
    /// An end at or beyond the end of the buffer clamps to the last code point.
    fn slice(
        &self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<String>;

    /// The code point starting at byte `pos`, or `None` when `pos` is at/after
    /// the end or not on a code point boundary.
    fn rune_at_pos(&self, pos: usize) -> Option<char>;

    /// Lazily yield `(byte position, code point)` pairs from `pos` to the end.
    fn runes_from(&self, pos: usize) -> Box<dyn Iterator<Item = (usize, char)> + '_>;

    /// Lazily yield `(byte position, code point)` pairs for the code points
    /// before `pos`, nearest first.
    fn runes_before(&self, pos: usize) -> Box<dyn Iterator<Item = (usize, char)> + '_>;

    /// Call `visit` for each code point from `pos` until the end of the buffer or
    /// until `visit` returns true.
    fn each_rune_from_pos(&self, pos: usize, visit: &mut dyn FnMut(usize, char) -> bool) {
        for (p, r) in self.runes_from(pos) {
            if visit(p, r) {
                break;
            }
        }
    }

    /// All bytes of the buffer. Copies everything; use sparingly.
    fn bytes(&self) -> Vec<u8>;

    /// Insert `text` at (line, col), shifting registered cursors at or after
    /// that position.
    fn insert(&mut self, line: usize, col: usize, text: &str) -> Result<()>;

    /// Delete the text from the start position up to, but not including, the end
    /// position. Registered cursors inside the range collapse to its start;
    /// cursors after it shift back.
    fn remove(
        &mut self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<()>;

    /// Non-overlapping occurrences of `pattern` in the inclusive range.
    fn count(
        &self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
        pattern: &str,
    ) -> Result<usize>;

    /// Length in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines: one more than the number of `'\n'`. Never less than 1.
    fn lines(&self) -> usize;

    fn line_delimiter(&self) -> LineDelimiter;

    fn set_line_delimiter(&mut self, delim: LineDelimiter);

    fn line_has_delimiter(&self, line: usize) -> Result<bool>;

    /// Code points in `line`, counting the delimiter when `delim` is true and one
    /// is present.
    fn runes_in_line(&self, line: usize, delim: bool) -> Result<(usize, bool)>;

    /// Clamp the line into `0..lines()`, then the column into
    /// `0..=runes_in_line(line, false)`.
    fn clamp_line_col(&self, line: usize, col: usize) -> (usize, usize);

    /// Byte offset of (line, col). A column past the line content walks into the
    /// delimiter and stops at its last byte.
    fn line_col_to_pos(&self, line: usize, col: usize) -> Result<usize>;

    /// (line, col) of byte `pos`, clamped to the buffer.
    fn pos_to_line_col(&self, pos: usize) -> (usize, usize);

    /// Write every byte to `sink`, returning the number written.
    fn write_to(&self, sink: &mut dyn io::Write) -> io::Result<u64>;

    /// Track `cursor` so edits keep it anchored to the text.
    fn register_cursor(&mut self, cursor: &Cursor);

    /// Stop tracking `cursor`. No-op if it is not registered.
    fn unregister_cursor(&mut self, cursor: &Cursor);
}
